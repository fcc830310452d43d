//! Linear-elastic reference model.
//!
//! Given a reference cell and a stiffness matrix `C`, the stress of a structure with
//! lattice `L` is
//!
//! ```text
//! Fᵀ = L_ref⁻¹ · L        (lattice rows a' = F·a)
//! ε  = voigt(½(FᵀF − I))
//! σ  = C · ε  (+ optional Gaussian noise per Voigt component)
//! ```
//!
//! Noise is drawn from a seeded `StdRng`, so two models built with the same seed give
//! identical stress sequences.

use nalgebra::{Matrix3, Matrix6, Vector6};
use rand::SeedableRng;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::deform::{Relaxer, StressEvaluator};
use crate::domain::{Deformation, Structure};
use crate::error::{ElasticError, EvaluatorError};
use crate::math::VOIGT_PAIRS;

#[derive(Debug, Clone)]
pub struct LinearElasticModel {
    reference: Structure,
    inverse_lattice: Matrix3<f64>,
    stiffness: Matrix6<f64>,
    noise: Option<(Normal<f64>, StdRng)>,
    evaluations: usize,
}

impl LinearElasticModel {
    pub fn new(reference: &Structure, stiffness: Matrix6<f64>) -> Result<Self, ElasticError> {
        let inverse_lattice = reference.lattice_matrix().try_inverse().ok_or_else(|| {
            ElasticError::Config("reference lattice is singular".to_string())
        })?;
        if stiffness.iter().any(|v| !v.is_finite()) {
            return Err(ElasticError::Config("stiffness matrix has non-finite entries".to_string()));
        }
        Ok(Self {
            reference: reference.clone(),
            inverse_lattice,
            stiffness,
            noise: None,
            evaluations: 0,
        })
    }

    /// Add zero-mean Gaussian noise with standard deviation `sigma` to every Voigt
    /// stress component.
    pub fn with_noise(mut self, sigma: f64, seed: u64) -> Result<Self, ElasticError> {
        if !(sigma.is_finite() && sigma >= 0.0) {
            return Err(ElasticError::Config(format!(
                "noise sigma must be finite and non-negative, got {sigma}"
            )));
        }
        let normal = Normal::new(0.0, sigma)
            .map_err(|e| ElasticError::Config(format!("noise distribution error: {e}")))?;
        self.noise = Some((normal, StdRng::seed_from_u64(seed)));
        Ok(self)
    }

    /// Number of stress evaluations performed so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn deformation_of(&self, structure: &Structure) -> Deformation {
        let f_t = self.inverse_lattice * structure.lattice_matrix();
        Deformation(f_t.transpose())
    }
}

impl StressEvaluator for LinearElasticModel {
    fn stress(&mut self, structure: &Structure) -> Result<Matrix3<f64>, EvaluatorError> {
        if structure.sites.len() != self.reference.sites.len() {
            return Err(format!(
                "structure has {} sites, reference model was built for {}",
                structure.sites.len(),
                self.reference.sites.len()
            )
            .into());
        }
        let strain = self.deformation_of(structure).green_lagrange_strain().voigt();
        let mut sigma: Vector6<f64> = self.stiffness * strain;
        if let Some((normal, rng)) = self.noise.as_mut() {
            for v in sigma.iter_mut() {
                *v += normal.sample(&mut *rng);
            }
        }
        self.evaluations += 1;

        let mut out = Matrix3::zeros();
        for (v, &(i, j)) in VOIGT_PAIRS.iter().enumerate() {
            out[(i, j)] = sigma[v];
            out[(j, i)] = sigma[v];
        }
        Ok(out)
    }
}

impl Relaxer for LinearElasticModel {
    /// The energy minimum of a linear-elastic solid is its reference cell; sites keep
    /// their fractional coordinates.
    fn relax(&mut self, structure: &Structure, _fmax: f64) -> Result<Structure, EvaluatorError> {
        Ok(Structure {
            lattice: self.reference.lattice,
            sites: structure.sites.clone(),
        })
    }
}
