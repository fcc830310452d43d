//! The elastic (stiffness) tensor.

use nalgebra::Matrix6;

use crate::error::ElasticError;
use crate::math::{FullTensor, full_to_voigt, mat6_from_rows, mat6_to_rows, voigt_to_full};

/// Default magnitude below which fitted entries are set to zero.
pub const DEFAULT_ZERO_TOL: f64 = 1e-7;

/// Stiffness tensor `C` in Voigt notation (`σ = C·ε`, engineering shear strains).
///
/// Row `i` holds the response to strain state `i`; `C[i][j]` is the slope of stress
/// component `j`. Symmetry is not enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElasticTensor(pub Matrix6<f64>);

impl ElasticTensor {
    /// Assemble from a 6×6 Voigt matrix via the full rank-4 representation.
    pub fn from_voigt(c: Matrix6<f64>) -> Self {
        Self::from_full(&voigt_to_full(&c))
    }

    pub fn from_full(t: &FullTensor) -> Self {
        Self(full_to_voigt(t))
    }

    pub fn from_rows(rows: &[[f64; 6]; 6]) -> Self {
        Self(mat6_from_rows(rows))
    }

    pub fn to_rows(&self) -> [[f64; 6]; 6] {
        mat6_to_rows(&self.0)
    }

    pub fn voigt(&self) -> &Matrix6<f64> {
        &self.0
    }

    /// Copy with every entry whose magnitude is below `tol` set to exactly `0.0`.
    pub fn zeroed(&self, tol: f64) -> Self {
        Self(self.0.map(|v| if v.abs() < tol { 0.0 } else { v }))
    }

    /// `(C + Cᵀ) / 2`.
    pub fn symmetrized(&self) -> Self {
        Self((self.0 + self.0.transpose()) * 0.5)
    }

    /// Largest `|C[i][j] - C[j][i]|`.
    pub fn max_asymmetry(&self) -> f64 {
        let mut worst = 0.0_f64;
        for i in 0..6 {
            for j in (i + 1)..6 {
                worst = worst.max((self.0[(i, j)] - self.0[(j, i)]).abs());
            }
        }
        worst
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.max_asymmetry() <= tol
    }

    /// Compliance `S = C⁻¹` in Voigt notation.
    pub fn compliance(&self) -> Result<Matrix6<f64>, ElasticError> {
        let s = self.0.try_inverse().ok_or_else(|| {
            ElasticError::NumericDomain("elastic tensor is singular; compliance undefined".to_string())
        })?;
        if s.iter().any(|v| !v.is_finite()) {
            return Err(ElasticError::NumericDomain(
                "elastic tensor inverse is not finite".to_string(),
            ));
        }
        Ok(s)
    }
}
