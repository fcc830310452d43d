//! Independent-strain deformation set.
//!
//! Order is fixed: every normal amplitude along `xx`, then `yy`, then `zz`, followed
//! by every shear amplitude along `xy`, `xz`, `yz`. Each strain has a single
//! (symmetric) tensor component and is realized by the upper-triangular deformation
//! gradient `F` with `FᵀF = 2E + I`.

use tracing::debug;

use crate::deform::{DeformationEnumerator, DeformationSet};
use crate::domain::{Deformation, Strain, Structure};
use crate::error::ElasticError;

const NORMAL_INDICES: [(usize, usize); 3] = [(0, 0), (1, 1), (2, 2)];
const SHEAR_INDICES: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

/// The standard enumerator: one deformation per (mode, amplitude).
#[derive(Debug, Clone, Copy, Default)]
pub struct IndependentDeformations;

impl IndependentDeformations {
    /// Deformation gradients in enumeration order.
    pub fn gradients(norm_strains: &[f64], shear_strains: &[f64]) -> Result<Vec<Deformation>, ElasticError> {
        let normal = NORMAL_INDICES
            .iter()
            .flat_map(|&ind| norm_strains.iter().map(move |&amount| (ind, amount)));
        let shear = SHEAR_INDICES
            .iter()
            .flat_map(|&ind| shear_strains.iter().map(move |&amount| (ind, amount)));

        normal
            .chain(shear)
            .map(|((i, j), amount)| Strain::from_index_amount(i, j, amount).deformation())
            .collect()
    }
}

impl DeformationEnumerator for IndependentDeformations {
    fn deformations(
        &self,
        structure: &Structure,
        norm_strains: &[f64],
        shear_strains: &[f64],
    ) -> Result<DeformationSet, ElasticError> {
        let deformations = Self::gradients(norm_strains, shear_strains)?;
        let structures = deformations.iter().map(|f| structure.deformed(f)).collect();
        debug!(count = deformations.len(), "generated independent deformations");
        DeformationSet::new(structures, deformations)
    }
}
