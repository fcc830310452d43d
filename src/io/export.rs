//! Export results to JSON.
//!
//! The report is meant to be easy to consume in notebooks or downstream scripts, and
//! records the configuration that produced it.

use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::app::pipeline::TensorFit;
use crate::domain::{ElasticConfig, ElasticResult, ElasticWarning, Structure};
use crate::error::ElasticError;
use crate::io::files::write_json;
use crate::tensor::ElasticModuli;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticReport {
    pub tool: String,
    pub generated: DateTime<Local>,
    pub config: ElasticConfig,
    /// Voigt rows (`xx, yy, zz, yz, xz, xy`).
    pub elastic_tensor: [[f64; 6]; 6],
    pub shear_modulus_vrh: f64,
    pub bulk_modulus_vrh: f64,
    pub youngs_modulus: f64,
    pub residuals_sum: f64,
    pub moduli: ElasticModuli,
    pub structure: Option<Structure>,
    pub warnings: Vec<ElasticWarning>,
}

impl ElasticReport {
    pub fn from_result(result: &ElasticResult, config: &ElasticConfig) -> Self {
        Self {
            tool: tool_name(),
            generated: Local::now(),
            config: config.clone(),
            elastic_tensor: result.elastic_tensor.to_rows(),
            shear_modulus_vrh: result.shear_modulus_vrh,
            bulk_modulus_vrh: result.bulk_modulus_vrh,
            youngs_modulus: result.youngs_modulus,
            residuals_sum: result.residuals_sum,
            moduli: result.moduli,
            structure: Some(result.structure.clone()),
            warnings: result.warnings.clone(),
        }
    }

    /// Report for a fit made from externally computed observations.
    pub fn from_fit(
        fit: &TensorFit,
        moduli: &ElasticModuli,
        structure: Option<Structure>,
        config: &ElasticConfig,
    ) -> Self {
        Self {
            tool: tool_name(),
            generated: Local::now(),
            config: config.clone(),
            elastic_tensor: fit.tensor.to_rows(),
            shear_modulus_vrh: moduli.g_vrh,
            bulk_modulus_vrh: moduli.k_vrh,
            youngs_modulus: moduli.youngs_modulus,
            residuals_sum: fit.residuals_sum,
            moduli: *moduli,
            structure,
            warnings: fit.warnings.clone(),
        }
    }
}

fn tool_name() -> String {
    format!("elastic {}", env!("CARGO_PKG_VERSION"))
}

pub fn write_report_json(path: &Path, report: &ElasticReport) -> Result<(), ElasticError> {
    write_json(path, report)
}
