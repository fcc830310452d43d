//! Stress sampling.
//!
//! One evaluator call per deformed structure, results kept in deformation order
//! (strains and stresses are later zipped positionally). Any evaluator failure aborts
//! the whole run; the evaluator's error is passed through as `ElasticError::Evaluator`.

use rayon::prelude::*;
use tracing::debug;

use crate::deform::StressEvaluator;
use crate::domain::{Stress, Structure};
use crate::error::ElasticError;

/// Evaluate stresses strictly sequentially with a single evaluator.
pub fn sample_stresses<E>(evaluator: &mut E, structures: &[Structure]) -> Result<Vec<Stress>, ElasticError>
where
    E: StressEvaluator + ?Sized,
{
    let mut out = Vec::with_capacity(structures.len());
    for (index, structure) in structures.iter().enumerate() {
        let stress = evaluator.stress(structure).map_err(ElasticError::Evaluator)?;
        debug!(index, "sampled stress");
        out.push(Stress(stress));
    }
    Ok(out)
}

/// Evaluate stresses on rayon's pool with one evaluator instance per worker.
///
/// `make_evaluator` is called once per worker split; instances are never shared.
/// Output order matches `structures`.
pub fn sample_stresses_par<E, F>(make_evaluator: F, structures: &[Structure]) -> Result<Vec<Stress>, ElasticError>
where
    E: StressEvaluator,
    F: Fn() -> E + Sync + Send,
{
    structures
        .par_iter()
        .map_init(&make_evaluator, |evaluator, structure| {
            evaluator
                .stress(structure)
                .map(Stress)
                .map_err(ElasticError::Evaluator)
        })
        .collect()
}
