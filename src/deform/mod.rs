//! Deformation sets and the external collaborator seams.
//!
//! The core never relaxes structures or computes stresses itself; it talks to:
//!
//! - a [`Relaxer`] (geometry optimizer)
//! - a [`DeformationEnumerator`] (deformed-structure generator)
//! - a [`StressEvaluator`] (force/stress model)
//!
//! [`IndependentDeformations`] is the standard enumerator.

pub mod independent;

pub use independent::*;

use nalgebra::Matrix3;

use crate::domain::{Deformation, Structure};
use crate::error::{ElasticError, EvaluatorError};

/// Geometry optimizer run before deformation.
pub trait Relaxer {
    /// Relax `structure` until the maximum force is below `fmax`.
    fn relax(&mut self, structure: &Structure, fmax: f64) -> Result<Structure, EvaluatorError>;
}

/// Force/stress model queried once per deformed structure.
///
/// Takes `&mut self` because evaluators commonly cache state between calls; a single
/// instance is never shared across threads.
pub trait StressEvaluator {
    /// Full 3×3 stress tensor of `structure`.
    fn stress(&mut self, structure: &Structure) -> Result<Matrix3<f64>, EvaluatorError>;
}

/// Produces the deformed structures used to probe the elastic response.
pub trait DeformationEnumerator {
    fn deformations(
        &self,
        structure: &Structure,
        norm_strains: &[f64],
        shear_strains: &[f64],
    ) -> Result<DeformationSet, ElasticError>;
}

impl<T: Relaxer + ?Sized> Relaxer for Box<T> {
    fn relax(&mut self, structure: &Structure, fmax: f64) -> Result<Structure, EvaluatorError> {
        (**self).relax(structure, fmax)
    }
}

impl<T: StressEvaluator + ?Sized> StressEvaluator for Box<T> {
    fn stress(&mut self, structure: &Structure) -> Result<Matrix3<f64>, EvaluatorError> {
        (**self).stress(structure)
    }
}

impl<T: StressEvaluator + ?Sized> StressEvaluator for &mut T {
    fn stress(&mut self, structure: &Structure) -> Result<Matrix3<f64>, EvaluatorError> {
        (**self).stress(structure)
    }
}

/// Deformed structures paired positionally with their deformation gradients.
#[derive(Debug, Clone)]
pub struct DeformationSet {
    pub structures: Vec<Structure>,
    pub deformations: Vec<Deformation>,
}

impl DeformationSet {
    pub fn new(structures: Vec<Structure>, deformations: Vec<Deformation>) -> Result<Self, ElasticError> {
        if structures.len() != deformations.len() {
            return Err(ElasticError::Config(format!(
                "deformation set has {} structures but {} deformations",
                structures.len(),
                deformations.len()
            )));
        }
        Ok(Self {
            structures,
            deformations,
        })
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}
