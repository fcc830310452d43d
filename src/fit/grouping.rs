//! Strain-state grouping.
//!
//! Each (strain, stress) observation is filed under the direction of its strain
//! (see [`StrainState::classify`]). The six independent states must all be present;
//! any other states are kept but never fitted, and are reported as a warning.

use std::collections::BTreeMap;

use nalgebra::Vector6;
use tracing::{debug, warn};

use crate::domain::{ElasticWarning, STRAIN_ZERO_TOL, StrainState, Strain, Stress};
use crate::error::ElasticError;

/// One observation in Voigt form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainStressPoint {
    pub strain: Vector6<f64>,
    pub stress: Vector6<f64>,
}

/// Observations keyed by strain state, each list sorted by strain magnitude.
#[derive(Debug, Clone, Default)]
pub struct StrainStressGroups {
    groups: BTreeMap<StrainState, Vec<StrainStressPoint>>,
}

impl StrainStressGroups {
    pub fn get(&self, state: &StrainState) -> Option<&[StrainStressPoint]> {
        self.groups.get(state).map(Vec::as_slice)
    }

    /// States that are not one of the six independent directions.
    pub fn extra_states(&self) -> Vec<StrainState> {
        self.groups.keys().filter(|s| !s.is_canonical()).copied().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Grouped observations plus any advisories raised while grouping.
#[derive(Debug, Clone)]
pub struct Grouping {
    pub groups: StrainStressGroups,
    pub warnings: Vec<ElasticWarning>,
}

/// Partition observations by strain state.
///
/// With `eq_stress`, the pair `(0, eq_stress)` is appended to every observed state.
/// The presence check runs before that, so the equilibrium point alone never
/// satisfies a missing state.
pub fn group_by_strain_state(
    strains: &[Strain],
    stresses: &[Stress],
    eq_stress: Option<&Stress>,
) -> Result<Grouping, ElasticError> {
    if strains.len() != stresses.len() {
        return Err(ElasticError::Config(format!(
            "got {} strains but {} stresses",
            strains.len(),
            stresses.len()
        )));
    }

    let mut groups: BTreeMap<StrainState, Vec<StrainStressPoint>> = BTreeMap::new();
    for (strain, stress) in strains.iter().zip(stresses) {
        let point = StrainStressPoint {
            strain: zero_small(strain.voigt()),
            stress: zero_small(stress.voigt()),
        };
        groups
            .entry(StrainState::classify(&point.strain))
            .or_default()
            .push(point);
    }

    let missing: Vec<StrainState> = StrainState::INDEPENDENT
        .iter()
        .filter(|s| !groups.contains_key(*s))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(ElasticError::MissingStrainStates(missing));
    }

    if let Some(eq) = eq_stress {
        let origin = StrainStressPoint {
            strain: Vector6::zeros(),
            stress: zero_small(eq.voigt()),
        };
        for points in groups.values_mut() {
            points.push(origin);
        }
    }

    for (state, points) in groups.iter_mut() {
        let axis = leading_axis(state);
        points.sort_by(|a, b| a.strain[axis].total_cmp(&b.strain[axis]));
        debug!(state = %state, points = points.len(), "grouped strain state");
    }

    let groups = StrainStressGroups { groups };
    let extra = groups.extra_states();
    let mut warnings = Vec::new();
    if !extra.is_empty() {
        let warning = ElasticWarning::ExtraStrainStates { states: extra };
        warn!("{warning}");
        warnings.push(warning);
    }

    Ok(Grouping { groups, warnings })
}

fn zero_small(v: Vector6<f64>) -> Vector6<f64> {
    v.map(|x| if x.abs() < STRAIN_ZERO_TOL { 0.0 } else { x })
}

fn leading_axis(state: &StrainState) -> usize {
    match state {
        StrainState::Canonical(axis) => *axis,
        StrainState::Other(key) => key.iter().position(|&k| k != 0).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deform::IndependentDeformations;
    use nalgebra::Matrix3;

    fn observations(norm: &[f64], shear: &[f64]) -> (Vec<Strain>, Vec<Stress>) {
        let strains: Vec<Strain> = IndependentDeformations::gradients(norm, shear)
            .unwrap()
            .iter()
            .map(|f| f.green_lagrange_strain())
            .collect();
        // Stress proportional to strain keeps the test independent of any model.
        let stresses = strains.iter().map(|e| Stress(e.0 * 100.0)).collect();
        (strains, stresses)
    }

    #[test]
    fn groups_every_independent_state() {
        let (strains, stresses) = observations(&[-0.01, 0.01], &[0.005]);
        let grouping = group_by_strain_state(&strains, &stresses, None).unwrap();
        assert!(grouping.warnings.is_empty());
        assert_eq!(grouping.groups.len(), 6);
        for axis in 0..6 {
            let n = grouping.groups.get(&StrainState::Canonical(axis)).unwrap().len();
            assert_eq!(n, if axis < 3 { 2 } else { 1 }, "axis {axis}");
        }
        // Sorted by the state's own component.
        let xx = grouping.groups.get(&StrainState::Canonical(0)).unwrap();
        assert!(xx[0].strain[0] < xx[1].strain[0]);
    }

    #[test]
    fn missing_normal_states_are_named_exactly() {
        let (strains, stresses) = observations(&[0.01], &[0.01]);
        // Keep only the shear deformations.
        let err = group_by_strain_state(&strains[3..], &stresses[3..], None).unwrap_err();
        match err {
            ElasticError::MissingStrainStates(states) => assert_eq!(
                states,
                vec![
                    StrainState::Canonical(0),
                    StrainState::Canonical(1),
                    StrainState::Canonical(2)
                ]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn equilibrium_point_is_added_to_each_state() {
        let (strains, stresses) = observations(&[0.01], &[0.01]);
        let eq = Stress(Matrix3::from_diagonal_element(-0.2));
        let with_eq = group_by_strain_state(&strains, &stresses, Some(&eq)).unwrap();
        let without = group_by_strain_state(&strains, &stresses, None).unwrap();
        for state in StrainState::INDEPENDENT {
            assert_eq!(with_eq.groups.get(&state).unwrap().len(), 2);
            assert_eq!(without.groups.get(&state).unwrap().len(), 1);
        }
        let yy = with_eq.groups.get(&StrainState::Canonical(1)).unwrap();
        assert_eq!(yy[0].strain, Vector6::zeros());
        assert_eq!(yy[0].stress[0], -0.2);
    }

    #[test]
    fn equilibrium_does_not_fill_a_missing_state() {
        let (strains, stresses) = observations(&[0.01], &[0.01]);
        let eq = Stress(Matrix3::zeros());
        let err = group_by_strain_state(&strains[1..], &stresses[1..], Some(&eq)).unwrap_err();
        assert!(matches!(err, ElasticError::MissingStrainStates(ref s) if s == &vec![StrainState::Canonical(0)]));
    }

    #[test]
    fn extra_states_are_kept_and_reported() {
        let (mut strains, mut stresses) = observations(&[0.01], &[0.01]);
        let mixed = Strain(Matrix3::new(0.01, 0.0, 0.0, 0.0, 0.01, 0.0, 0.0, 0.0, 0.0));
        strains.push(mixed);
        stresses.push(Stress(mixed.0 * 100.0));

        let grouping = group_by_strain_state(&strains, &stresses, None).unwrap();
        assert_eq!(grouping.groups.len(), 7);
        let extra = grouping.groups.extra_states();
        assert_eq!(extra.len(), 1);
        assert_eq!(
            grouping.warnings,
            vec![ElasticWarning::ExtraStrainStates { states: extra }]
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let (strains, stresses) = observations(&[0.01], &[0.01]);
        let err = group_by_strain_state(&strains, &stresses[1..], None).unwrap_err();
        assert!(matches!(err, ElasticError::Config(_)));
    }
}
