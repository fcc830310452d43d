//! Read/write the crate's JSON files.
//!
//! - structure: `{ "lattice": [[..3]; 3], "sites": [{ "species", "frac_coords" }] }`
//! - tensor: a 6×6 array of rows in Voigt order
//! - config: any subset of `ElasticConfig` fields
//! - deformation set: `[{ "deformation": [[..3]; 3], "structure": {..} }]`

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::deform::DeformationSet;
use crate::domain::{ElasticConfig, Structure};
use crate::error::ElasticError;
use crate::math::mat3_to_rows;
use crate::tensor::ElasticTensor;

/// One entry of an exported deformation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeformedEntry {
    pub deformation: [[f64; 3]; 3],
    pub structure: Structure,
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ElasticError> {
    let file = File::open(path).map_err(|e| {
        ElasticError::Config(format!("Failed to open '{}': {e}", path.display()))
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), ElasticError> {
    let file = File::create(path).map_err(|e| {
        ElasticError::Config(format!("Failed to create '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}

pub fn read_structure(path: &Path) -> Result<Structure, ElasticError> {
    let structure: Structure = read_json(path)?;
    if structure.volume() <= 0.0 || !structure.volume().is_finite() {
        return Err(ElasticError::Config(format!(
            "Structure '{}' has a degenerate lattice",
            path.display()
        )));
    }
    Ok(structure)
}

pub fn read_tensor(path: &Path) -> Result<ElasticTensor, ElasticError> {
    let rows: [[f64; 6]; 6] = read_json(path)?;
    if rows.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ElasticError::Config(format!(
            "Tensor '{}' has non-finite entries",
            path.display()
        )));
    }
    Ok(ElasticTensor::from_rows(&rows))
}

pub fn read_config(path: &Path) -> Result<ElasticConfig, ElasticError> {
    read_json(path)
}

pub fn deformation_entries(set: &DeformationSet) -> Vec<DeformedEntry> {
    set.deformations
        .iter()
        .zip(&set.structures)
        .map(|(f, s)| DeformedEntry {
            deformation: mat3_to_rows(&f.0),
            structure: s.clone(),
        })
        .collect()
}

pub fn write_deformation_set(path: &Path, set: &DeformationSet) -> Result<(), ElasticError> {
    write_json(path, &deformation_entries(set))
}
