//! Independent-strain fitting.
//!
//! For each independent strain state `i` we take
//! - the strain component `ε_i` of every observation in that state
//! - every stress component `σ_j`
//!
//! and fit `σ_j ≈ C_ij ε_i + b_ij`. Only the slope is kept. The six states are
//! independent, so they are fitted in parallel; residuals are summed in state order so
//! repeated runs give bit-identical totals.

use nalgebra::Matrix6;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::StrainState;
use crate::error::ElasticError;
use crate::fit::grouping::{StrainStressGroups, StrainStressPoint};
use crate::math::linear_fit;

/// Raw fit output before tensor assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct IndependentFit {
    /// `c_ij[(i, j)]`: slope of stress `j` against strain component `i`.
    pub c_ij: Matrix6<f64>,
    /// Sum of squared residuals over all 36 fits.
    pub residuals_sum: f64,
}

/// Fitted row for one strain state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateFit {
    pub slopes: [f64; 6],
    pub residual: f64,
    pub n_points: usize,
}

/// Fit the six stress components against strain component `axis`.
pub fn fit_state(points: &[StrainStressPoint], axis: usize) -> Result<StateFit, ElasticError> {
    let x: Vec<f64> = points.iter().map(|p| p.strain[axis]).collect();
    let mut slopes = [0.0; 6];
    let mut residual = 0.0;
    for (j, slope) in slopes.iter_mut().enumerate() {
        let y: Vec<f64> = points.iter().map(|p| p.stress[j]).collect();
        let fit = linear_fit(&x, &y)?;
        *slope = fit.slope;
        residual += fit.residual;
    }
    Ok(StateFit {
        slopes,
        residual,
        n_points: points.len(),
    })
}

/// Fit all six independent strain states. Other states in `groups` are ignored.
pub fn fit_independent_states(groups: &StrainStressGroups) -> Result<IndependentFit, ElasticError> {
    let rows: Vec<StateFit> = (0..6)
        .into_par_iter()
        .map(|axis| {
            let state = StrainState::Canonical(axis);
            let points = groups
                .get(&state)
                .ok_or_else(|| ElasticError::MissingStrainStates(vec![state]))?;
            fit_state(points, axis)
        })
        .collect::<Result<_, _>>()?;

    let mut c_ij = Matrix6::zeros();
    let mut residuals_sum = 0.0;
    for (i, row) in rows.iter().enumerate() {
        for (j, &slope) in row.slopes.iter().enumerate() {
            c_ij[(i, j)] = slope;
        }
        residuals_sum += row.residual;
        debug!(axis = i, n_points = row.n_points, residual = row.residual, "fitted strain state");
    }

    Ok(IndependentFit { c_ij, residuals_sum })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::IndependentDeformations;
    use crate::domain::{Strain, Stress};
    use crate::fit::grouping::group_by_strain_state;
    use crate::math::VOIGT_PAIRS;
    use nalgebra::{Matrix3, Vector6};

    fn stress_from_voigt(v: &Vector6<f64>) -> Stress {
        let mut m = Matrix3::zeros();
        for (k, &(i, j)) in VOIGT_PAIRS.iter().enumerate() {
            m[(i, j)] = v[k];
            m[(j, i)] = v[k];
        }
        Stress(m)
    }

    fn linear_observations(c: &Matrix6<f64>, norm: &[f64], shear: &[f64]) -> (Vec<Strain>, Vec<Stress>) {
        let strains: Vec<Strain> = IndependentDeformations::gradients(norm, shear)
            .unwrap()
            .iter()
            .map(|f| f.green_lagrange_strain())
            .collect();
        let stresses = strains.iter().map(|e| stress_from_voigt(&(c * e.voigt()))).collect();
        (strains, stresses)
    }

    fn stiffness() -> Matrix6<f64> {
        Matrix6::from_fn(|i, j| if i == j { 200.0 - 10.0 * i as f64 } else { 5.0 + (i + j) as f64 })
    }

    #[test]
    fn recovers_linear_response_from_several_amplitudes() {
        let c = stiffness();
        let (strains, stresses) = linear_observations(&c, &[-0.01, -0.005, 0.005, 0.01], &[-0.008, 0.004, 0.01]);
        let grouping = group_by_strain_state(&strains, &stresses, None).unwrap();
        let fit = fit_independent_states(&grouping.groups).unwrap();
        for i in 0..6 {
            for j in 0..6 {
                // Row i of the fit is the response to strain i: C_ji for σ = C·ε.
                assert!((fit.c_ij[(i, j)] - c[(j, i)]).abs() < 1e-8, "({i},{j})");
            }
        }
        assert!(fit.residuals_sum < 1e-20);
    }

    #[test]
    fn single_point_states_have_zero_residual() {
        let c = stiffness();
        let (strains, stresses) = linear_observations(&c, &[0.01], &[0.01]);
        let grouping = group_by_strain_state(&strains, &stresses, None).unwrap();
        let fit = fit_independent_states(&grouping.groups).unwrap();
        assert_eq!(fit.residuals_sum, 0.0);
        assert!((fit.c_ij[(0, 0)] - c[(0, 0)]).abs() < 1e-9);
    }

    #[test]
    fn residual_reflects_scatter() {
        let points: Vec<StrainStressPoint> = [(0.001, 0.1), (0.002, 0.3), (0.003, 0.2)]
            .iter()
            .map(|&(e, s)| StrainStressPoint {
                strain: Vector6::new(e, 0.0, 0.0, 0.0, 0.0, 0.0),
                stress: Vector6::new(s, 0.0, 0.0, 0.0, 0.0, 0.0),
            })
            .collect();
        let fit = fit_state(&points, 0).unwrap();
        assert_eq!(fit.n_points, 3);
        assert!((fit.slopes[0] - 50.0).abs() < 1e-8);
        assert!((fit.residual - 0.015).abs() < 1e-12);
        assert_eq!(fit.slopes[3], 0.0);
    }
}
