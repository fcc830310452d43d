//! Aggregate moduli from an elastic tensor.
//!
//! Voigt (uniform strain) bounds use `C`, Reuss (uniform stress) bounds use the
//! compliance `S = C⁻¹`, both in Voigt notation:
//!
//! ```text
//! K_V = (C11 + C22 + C33 + 2(C12 + C13 + C23)) / 9
//! G_V = ((C11 + C22 + C33) - (C12 + C13 + C23) + 3(C44 + C55 + C66)) / 15
//! K_R = 1 / (S11 + S22 + S33 + 2(S12 + S13 + S23))
//! G_R = 15 / (4(S11 + S22 + S33) - 4(S12 + S13 + S23) + 3(S44 + S55 + S66))
//! ```
//!
//! Hill values are the arithmetic means, and `E = 9KG / (3K + G)`.

use nalgebra::Matrix6;
use serde::{Deserialize, Serialize};

use crate::error::ElasticError;
use crate::tensor::ElasticTensor;

/// All moduli derived from one tensor (same units as the tensor).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElasticModuli {
    pub k_voigt: f64,
    pub k_reuss: f64,
    pub k_vrh: f64,
    pub g_voigt: f64,
    pub g_reuss: f64,
    pub g_vrh: f64,
    pub youngs_modulus: f64,
    pub universal_anisotropy: f64,
    pub homogeneous_poisson: f64,
}

impl ElasticModuli {
    pub fn from_tensor(tensor: &ElasticTensor) -> Result<Self, ElasticError> {
        let c = tensor.voigt();
        let s = tensor.compliance()?;

        let k_voigt = k_voigt(c);
        let g_voigt = g_voigt(c);
        let k_reuss = reciprocal(block_sum(&s), "Reuss bulk modulus")?;
        let g_reuss = 15.0
            * reciprocal(
                8.0 * trace3(&s) - 4.0 * upper_sum(&s) + 3.0 * shear_trace(&s),
                "Reuss shear modulus",
            )?;

        let k_vrh = 0.5 * (k_voigt + k_reuss);
        let g_vrh = 0.5 * (g_voigt + g_reuss);
        let youngs_modulus = youngs_modulus(k_vrh, g_vrh)?;

        let universal_anisotropy = 5.0 * quotient(g_voigt, g_reuss, "universal anisotropy")?
            + quotient(k_voigt, k_reuss, "universal anisotropy")?
            - 6.0;
        let ratio = quotient(g_vrh, k_vrh, "Poisson ratio")?;
        let homogeneous_poisson = quotient(
            1.0 - 2.0 / 3.0 * ratio,
            2.0 + 2.0 / 3.0 * ratio,
            "Poisson ratio",
        )?;

        Ok(Self {
            k_voigt,
            k_reuss,
            k_vrh,
            g_voigt,
            g_reuss,
            g_vrh,
            youngs_modulus,
            universal_anisotropy,
            homogeneous_poisson,
        })
    }
}

/// Young's modulus of an isotropic solid with bulk modulus `k` and shear modulus `g`.
///
/// `3K + G = 0` is an error, never NaN or infinity.
pub fn youngs_modulus(k: f64, g: f64) -> Result<f64, ElasticError> {
    let denom = 3.0 * k + g;
    if denom == 0.0 || !denom.is_finite() {
        return Err(ElasticError::NumericDomain(format!(
            "Young's modulus undefined for K={k}, G={g} (3K + G = {denom})"
        )));
    }
    let e = 9.0 * k * g / denom;
    if !e.is_finite() {
        return Err(ElasticError::NumericDomain(format!(
            "Young's modulus not finite for K={k}, G={g}"
        )));
    }
    Ok(e)
}

fn k_voigt(c: &Matrix6<f64>) -> f64 {
    block_sum(c) / 9.0
}

fn g_voigt(c: &Matrix6<f64>) -> f64 {
    (2.0 * trace3(c) - upper_sum(c) + 3.0 * shear_trace(c)) / 15.0
}

fn reciprocal(value: f64, what: &str) -> Result<f64, ElasticError> {
    if value == 0.0 || !value.is_finite() {
        return Err(ElasticError::NumericDomain(format!(
            "{what} undefined (denominator {value})"
        )));
    }
    Ok(1.0 / value)
}

/// `num / den`, with a zero denominator or a non-finite result reported as an error.
fn quotient(num: f64, den: f64, what: &str) -> Result<f64, ElasticError> {
    let q = num / den;
    if den == 0.0 || !q.is_finite() {
        return Err(ElasticError::NumericDomain(format!(
            "{what} undefined ({num} / {den})"
        )));
    }
    Ok(q)
}

/// Sum of the upper-left 3×3 block.
fn block_sum(m: &Matrix6<f64>) -> f64 {
    m.fixed_view::<3, 3>(0, 0).sum()
}

fn trace3(m: &Matrix6<f64>) -> f64 {
    m[(0, 0)] + m[(1, 1)] + m[(2, 2)]
}

/// Sum of the upper triangle (diagonal included) of the upper-left 3×3 block.
fn upper_sum(m: &Matrix6<f64>) -> f64 {
    m.fixed_view::<3, 3>(0, 0).upper_triangle().sum()
}

fn shear_trace(m: &Matrix6<f64>) -> f64 {
    m[(3, 3)] + m[(4, 4)] + m[(5, 5)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn cubic(c11: f64, c12: f64, c44: f64) -> ElasticTensor {
        let mut c = Matrix6::zeros();
        for i in 0..3 {
            for j in 0..3 {
                c[(i, j)] = if i == j { c11 } else { c12 };
            }
            c[(i + 3, i + 3)] = c44;
        }
        ElasticTensor(c)
    }

    #[test]
    fn isotropic_tensor_bounds_coincide() {
        // Isotropic: C44 = (C11 - C12) / 2.
        let lambda = 60.0;
        let mu = 40.0;
        let t = cubic(lambda + 2.0 * mu, lambda, mu);
        let m = ElasticModuli::from_tensor(&t).unwrap();

        let k = lambda + 2.0 / 3.0 * mu;
        assert_relative_eq!(m.k_voigt, k, epsilon = 1e-10);
        assert_relative_eq!(m.k_reuss, k, epsilon = 1e-10);
        assert_relative_eq!(m.g_voigt, mu, epsilon = 1e-10);
        assert_relative_eq!(m.g_reuss, mu, epsilon = 1e-10);
        assert_relative_eq!(m.youngs_modulus, mu * (3.0 * lambda + 2.0 * mu) / (lambda + mu), epsilon = 1e-9);
        assert_relative_eq!(m.homogeneous_poisson, lambda / (2.0 * (lambda + mu)), epsilon = 1e-12);
        assert_relative_eq!(m.universal_anisotropy, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn cubic_closed_forms() {
        let (c11, c12, c44) = (250.0, 150.0, 120.0);
        let m = ElasticModuli::from_tensor(&cubic(c11, c12, c44)).unwrap();

        let k = (c11 + 2.0 * c12) / 3.0;
        let g_v = (c11 - c12 + 3.0 * c44) / 5.0;
        let g_r = 5.0 * (c11 - c12) * c44 / (4.0 * c44 + 3.0 * (c11 - c12));
        assert_relative_eq!(m.k_vrh, k, epsilon = 1e-9);
        assert_relative_eq!(m.g_voigt, g_v, epsilon = 1e-9);
        assert_relative_eq!(m.g_reuss, g_r, epsilon = 1e-9);
        assert!(m.g_reuss < m.g_voigt);
        assert!(m.universal_anisotropy > 0.0);
    }

    #[test]
    fn youngs_modulus_rejects_zero_denominator() {
        let err = youngs_modulus(1.0, -3.0).unwrap_err();
        assert!(matches!(err, ElasticError::NumericDomain(_)));
        assert_relative_eq!(youngs_modulus(100.0, 50.0).unwrap(), 9.0 * 100.0 * 50.0 / 350.0);
    }

    #[test]
    fn quotient_with_zero_or_tiny_denominator_is_a_domain_error() {
        assert!(matches!(quotient(0.4, 0.0, "Poisson ratio"), Err(ElasticError::NumericDomain(_))));
        assert!(matches!(quotient(f64::MAX, 1e-300, "x"), Err(ElasticError::NumericDomain(_))));
        assert_relative_eq!(quotient(1.0, 4.0, "x").unwrap(), 0.25);
    }

    #[test]
    fn singular_tensor_is_a_domain_error() {
        let t = cubic(100.0, 100.0, 30.0);
        assert!(matches!(
            ElasticModuli::from_tensor(&t),
            Err(ElasticError::NumericDomain(_))
        ));
    }
}
