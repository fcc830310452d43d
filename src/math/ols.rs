//! Least squares solvers.
//!
//! Every elastic constant is the slope of a small straight-line fit
//! (stress component vs strain component). The fits are tiny (a handful of rows,
//! two columns), so robustness matters more than speed.
//!
//! Implementation choices:
//! - The design matrix is `[x / scale, 1]`; scaling the strain column by its largest
//!   magnitude keeps both columns O(1) (strains are ~1e-3).
//! - We use SVD to solve the least-squares problem robustly even when the design
//!   matrix is tall (more rows than columns).
//!   (Nalgebra's `QR::solve` is intended for square systems and will panic for
//!   non-square matrices.)
//! - Fits with no remaining degrees of freedom report a residual of exactly zero.

use nalgebra::{DMatrix, DVector};

use crate::error::ElasticError;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Result of a degree-1 fit `y ≈ slope·x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Sum of squared residuals.
    pub residual: f64,
}

/// Ordinary least squares straight-line fit.
///
/// Degenerate inputs:
/// - one point: the line through the origin (`slope = y/x`), residual 0
/// - two distinct x values: the exact line through both points, residual 0
/// - all x equal (and nonzero): slope through the origin fitted to all points
/// - all x zero: `NumericDomain`
pub fn linear_fit(x: &[f64], y: &[f64]) -> Result<LinearFit, ElasticError> {
    if x.len() != y.len() {
        return Err(ElasticError::Config(format!(
            "linear fit needs paired samples, got {} x and {} y values",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(ElasticError::NumericDomain("linear fit with no samples".to_string()));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(ElasticError::NumericDomain("non-finite sample in linear fit".to_string()));
    }

    let n = x.len();
    let scale = x.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 {
        return Err(ElasticError::NumericDomain(
            "cannot fit a slope when every strain value is zero".to_string(),
        ));
    }

    let x_min = x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (x_max - x_min) <= f64::EPSILON * scale {
        let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
        let sxx: f64 = x.iter().map(|a| a * a).sum();
        let slope = sxy / sxx;
        let residual = if n == 1 { 0.0 } else { sse(x, y, slope, 0.0) };
        return Ok(LinearFit {
            slope,
            intercept: 0.0,
            residual,
        });
    }

    let design = DMatrix::from_fn(n, 2, |r, c| if c == 0 { x[r] / scale } else { 1.0 });
    let rhs = DVector::from_column_slice(y);
    let beta = solve_least_squares(&design, &rhs).ok_or_else(|| {
        ElasticError::NumericDomain("ill-conditioned strain-stress fit".to_string())
    })?;

    let slope = beta[0] / scale;
    let intercept = beta[1];
    let residual = if n <= 2 { 0.0 } else { sse(x, y, slope, intercept) };
    Ok(LinearFit {
        slope,
        intercept,
        residual,
    })
}

fn sse(x: &[f64], y: &[f64], slope: f64, intercept: f64) -> f64 {
    x.iter()
        .zip(y)
        .map(|(a, b)| {
            let r = b - (slope * a + intercept);
            r * r
        })
        .sum()
}
