//! Externally computed strain/stress observations.
//!
//! When the stress evaluator runs outside this crate (a DFT code, a cluster job, ...),
//! its results are collected into one JSON file:
//!
//! ```json
//! {
//!   "structure": { ... },                 // optional, echoed into the report
//!   "deformations": [ [[..3]; 3], ... ],
//!   "stresses":     [ [[..3]; 3], ... ],  // same order as deformations
//!   "equilibrium_stress": [[..3]; 3]      // optional
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Deformation, Strain, Stress, Structure};
use crate::error::ElasticError;
use crate::io::files::read_json;
use crate::math::mat3_from_rows;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationSet {
    #[serde(default)]
    pub structure: Option<Structure>,
    pub deformations: Vec<[[f64; 3]; 3]>,
    pub stresses: Vec<[[f64; 3]; 3]>,
    #[serde(default)]
    pub equilibrium_stress: Option<[[f64; 3]; 3]>,
}

impl ObservationSet {
    pub fn validate(&self) -> Result<(), ElasticError> {
        if self.deformations.len() != self.stresses.len() {
            return Err(ElasticError::Config(format!(
                "observation set has {} deformations but {} stresses",
                self.deformations.len(),
                self.stresses.len()
            )));
        }
        let all = self
            .deformations
            .iter()
            .chain(&self.stresses)
            .chain(self.equilibrium_stress.iter());
        for m in all {
            if m.iter().flatten().any(|v| !v.is_finite()) {
                return Err(ElasticError::Config(
                    "observation set contains non-finite values".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn strains(&self) -> Vec<Strain> {
        self.deformations
            .iter()
            .map(|rows| Deformation(mat3_from_rows(rows)).green_lagrange_strain())
            .collect()
    }

    pub fn stress_tensors(&self) -> Vec<Stress> {
        self.stresses
            .iter()
            .map(|rows| Stress(mat3_from_rows(rows)))
            .collect()
    }

    pub fn equilibrium(&self) -> Option<Stress> {
        self.equilibrium_stress
            .as_ref()
            .map(|rows| Stress(mat3_from_rows(rows)))
    }
}

pub fn read_observations(path: &Path) -> Result<ObservationSet, ElasticError> {
    let set: ObservationSet = read_json(path)?;
    set.validate()?;
    Ok(set)
}
