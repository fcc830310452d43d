//! The elastic-tensor pipeline.
//!
//! relax (optional) -> deform -> sample stresses -> group by strain state
//! -> fit independent states -> assemble tensor -> moduli
//!
//! Both the CLI commands and library users go through this module, so the workflow
//! lives in exactly one place.

use tracing::{debug, info};

use crate::deform::{DeformationEnumerator, IndependentDeformations, Relaxer, StressEvaluator};
use crate::domain::{ElasticConfig, ElasticResult, ElasticWarning, Strain, Stress, Structure};
use crate::error::ElasticError;
use crate::fit::{fit_independent_states, group_by_strain_state, sample_stresses};
use crate::tensor::{ElasticModuli, ElasticTensor};

/// Tensor fitted from strain/stress observations.
#[derive(Debug, Clone)]
pub struct TensorFit {
    pub tensor: ElasticTensor,
    pub residuals_sum: f64,
    pub warnings: Vec<ElasticWarning>,
}

/// Fit an elastic tensor from parallel lists of strains and stresses.
///
/// `eq_stress` (the stress of the undeformed structure) is added to every strain state
/// as a zero-strain point. Entries below `config.tol` are zeroed; with
/// `config.symmetrize` the tensor is replaced by `(C + Cᵀ)/2` first.
pub fn elastic_tensor_from_strains(
    strains: &[Strain],
    stresses: &[Stress],
    eq_stress: Option<&Stress>,
    config: &ElasticConfig,
) -> Result<TensorFit, ElasticError> {
    let grouping = group_by_strain_state(strains, stresses, eq_stress)?;
    let fit = fit_independent_states(&grouping.groups)?;

    let mut tensor = ElasticTensor::from_voigt(fit.c_ij);
    if config.symmetrize {
        tensor = tensor.symmetrized();
    }
    let tensor = tensor.zeroed(config.tol);

    let asymmetry = tensor.max_asymmetry();
    if asymmetry > config.tol {
        debug!(asymmetry, "fitted elastic tensor is not symmetric");
    }

    Ok(TensorFit {
        tensor,
        residuals_sum: fit.residuals_sum,
        warnings: grouping.warnings,
    })
}

/// Elastic-property calculator bound to one stress evaluator.
pub struct ElasticityCalc<E> {
    evaluator: E,
    config: ElasticConfig,
    relaxer: Option<Box<dyn Relaxer>>,
    enumerator: Box<dyn DeformationEnumerator>,
}

impl<E: StressEvaluator> ElasticityCalc<E> {
    pub fn new(evaluator: E, config: ElasticConfig) -> Self {
        Self {
            evaluator,
            config,
            relaxer: None,
            enumerator: Box::new(IndependentDeformations),
        }
    }

    /// Relaxer used when `relax_structure` is set.
    pub fn with_relaxer(mut self, relaxer: impl Relaxer + 'static) -> Self {
        self.relaxer = Some(Box::new(relaxer));
        self
    }

    pub fn with_enumerator(mut self, enumerator: impl DeformationEnumerator + 'static) -> Self {
        self.enumerator = Box::new(enumerator);
        self
    }

    pub fn config(&self) -> &ElasticConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Compute the elastic tensor and moduli of `structure`.
    ///
    /// Nothing is kept between calls. Any failure aborts the run; no partial tensor is
    /// returned.
    pub fn calc(&mut self, structure: &Structure) -> Result<ElasticResult, ElasticError> {
        self.config.validate()?;
        let config = &self.config;

        let structure = if config.relax_structure {
            let relaxer = self.relaxer.as_mut().ok_or_else(|| {
                ElasticError::Config(
                    "relax_structure is enabled but no relaxer was provided".to_string(),
                )
            })?;
            info!(fmax = config.fmax, "relaxing structure");
            relaxer
                .relax(structure, config.fmax)
                .map_err(ElasticError::Evaluator)?
        } else {
            structure.clone()
        };

        let set = self
            .enumerator
            .deformations(&structure, &config.norm_strains, &config.shear_strains)?;
        info!(count = set.len(), "evaluating deformed structures");

        let stresses = sample_stresses(&mut self.evaluator, &set.structures)?;
        let strains: Vec<Strain> = set
            .deformations
            .iter()
            .map(|f| f.green_lagrange_strain())
            .collect();

        let eq_stress = if config.use_equilibrium {
            let stress = self
                .evaluator
                .stress(&structure)
                .map_err(ElasticError::Evaluator)?;
            Some(Stress(stress))
        } else {
            None
        };

        let fit = elastic_tensor_from_strains(&strains, &stresses, eq_stress.as_ref(), config)?;
        let moduli = ElasticModuli::from_tensor(&fit.tensor)?;
        info!(
            k_vrh = moduli.k_vrh,
            g_vrh = moduli.g_vrh,
            residuals_sum = fit.residuals_sum,
            "elastic tensor fitted"
        );

        Ok(ElasticResult {
            elastic_tensor: fit.tensor,
            shear_modulus_vrh: moduli.g_vrh,
            bulk_modulus_vrh: moduli.k_vrh,
            youngs_modulus: moduli.youngs_modulus,
            residuals_sum: fit.residuals_sum,
            structure,
            moduli,
            warnings: fit.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvaluatorError;
    use crate::models::LinearElasticModel;
    use nalgebra::{Matrix3, Matrix6};

    fn cubic_structure() -> Structure {
        Structure::new(Matrix3::identity() * 3.61, vec![crate::domain::Site {
            species: "Cu".to_string(),
            frac_coords: [0.0, 0.0, 0.0],
        }])
    }

    fn cubic_stiffness() -> Matrix6<f64> {
        let (c11, c12, c44) = (1.05, 0.75, 0.47);
        let mut c = Matrix6::zeros();
        for i in 0..3 {
            for j in 0..3 {
                c[(i, j)] = if i == j { c11 } else { c12 };
            }
            c[(i + 3, i + 3)] = c44;
        }
        c
    }

    fn no_relax(norm: &[f64], shear: &[f64]) -> ElasticConfig {
        ElasticConfig {
            norm_strains: norm.to_vec(),
            shear_strains: shear.to_vec(),
            relax_structure: false,
            ..ElasticConfig::default()
        }
    }

    #[test]
    fn cubic_structure_gives_symmetric_tensor() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness()).unwrap();
        let mut calc = ElasticityCalc::new(model, no_relax(&[0.001, 0.003, 0.005, 0.01], &[0.001, 0.003, 0.005, 0.01]));
        let result = calc.calc(&base).unwrap();
        assert!(result.elastic_tensor.is_symmetric(1e-8));
        assert!(result.warnings.is_empty());
        assert_eq!(calc.evaluator().evaluations(), 24);
    }

    #[test]
    fn zeroed_entries_are_exactly_zero() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness()).unwrap();
        let mut calc = ElasticityCalc::new(model, no_relax(&[0.005, 0.01], &[0.005, 0.01]));
        let result = calc.calc(&base).unwrap();
        let c = result.elastic_tensor.voigt();
        for i in 0..6 {
            for j in 0..6 {
                assert!(c[(i, j)] == 0.0 || c[(i, j)].abs() >= 1e-7);
            }
        }
        assert_eq!(c[(0, 3)], 0.0);
        assert_eq!(c[(3, 4)], 0.0);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness())
            .unwrap()
            .with_noise(1e-4, 3)
            .unwrap();
        // Same seed, fresh evaluator each time: a deterministic evaluator.
        let mut first = ElasticityCalc::new(model.clone(), no_relax(&[0.002, 0.006, 0.01], &[0.002, 0.006, 0.01]));
        let mut second = ElasticityCalc::new(model, no_relax(&[0.002, 0.006, 0.01], &[0.002, 0.006, 0.01]));
        let a = first.calc(&base).unwrap();
        let b = second.calc(&base).unwrap();
        assert_eq!(a.elastic_tensor, b.elastic_tensor);
        assert_eq!(a.residuals_sum, b.residuals_sum);
        assert!(a.residuals_sum > 0.0);
    }

    #[test]
    fn same_calc_gives_same_result_twice() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness()).unwrap();
        let mut calc = ElasticityCalc::new(model, no_relax(&[-0.01, 0.005, 0.01], &[-0.008, 0.008]));
        let a = calc.calc(&base).unwrap();
        let b = calc.calc(&base).unwrap();
        assert_eq!(a.elastic_tensor, b.elastic_tensor);
        assert_eq!(a.residuals_sum, b.residuals_sum);
        assert_eq!(a.moduli, b.moduli);
        assert_eq!(a.warnings, b.warnings);
        // Each run samples its own 15 deformations; nothing is reused.
        assert_eq!(calc.evaluator().evaluations(), 30);
    }

    #[test]
    fn equilibrium_stress_is_sampled_once() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness()).unwrap();
        let mut config = no_relax(&[0.01], &[0.01]);
        config.use_equilibrium = true;
        let mut calc = ElasticityCalc::new(model, config);
        let result = calc.calc(&base).unwrap();
        assert_eq!(calc.evaluator().evaluations(), 7);
        // Two points per state: an exact line, so no residual.
        assert_eq!(result.residuals_sum, 0.0);
        assert!((result.elastic_tensor.voigt()[(0, 0)] - 1.05).abs() < 1e-9);
    }

    #[test]
    fn relaxation_requires_a_relaxer() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness()).unwrap();
        let config = ElasticConfig {
            relax_structure: true,
            ..no_relax(&[0.01], &[0.01])
        };
        let err = ElasticityCalc::new(model, config).calc(&base).unwrap_err();
        assert!(matches!(err, ElasticError::Config(_)));
    }

    #[test]
    fn relaxed_structure_is_reported() {
        let base = cubic_structure();
        let model = LinearElasticModel::new(&base, cubic_stiffness()).unwrap();
        let config = ElasticConfig {
            relax_structure: true,
            ..no_relax(&[0.01], &[0.01])
        };
        let strained = Structure::new(base.lattice_matrix() * 1.02, base.sites.clone());
        let mut calc = ElasticityCalc::new(model.clone(), config).with_relaxer(model);
        let result = calc.calc(&strained).unwrap();
        assert_eq!(result.structure, base);
    }

    struct Broken;

    impl StressEvaluator for Broken {
        fn stress(&mut self, _structure: &Structure) -> Result<Matrix3<f64>, EvaluatorError> {
            Err("potential not loaded".into())
        }
    }

    #[test]
    fn evaluator_errors_propagate_unchanged() {
        let mut calc = ElasticityCalc::new(Broken, no_relax(&[0.01], &[0.01]));
        let err = calc.calc(&cubic_structure()).unwrap_err();
        match err {
            ElasticError::Evaluator(inner) => assert_eq!(inner.to_string(), "potential not loaded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn symmetrize_is_opt_in() {
        let mut strains = Vec::new();
        let mut stresses = Vec::new();
        // Asymmetric response: σ_yy responds to ε_xx more strongly than σ_xx to ε_yy.
        let mut c = cubic_stiffness();
        c[(1, 0)] += 0.1;
        for f in IndependentDeformations::gradients(&[0.01], &[0.01]).unwrap() {
            let e = f.green_lagrange_strain();
            let s = c * e.voigt();
            let mut m = Matrix3::zeros();
            for (k, &(i, j)) in crate::math::VOIGT_PAIRS.iter().enumerate() {
                m[(i, j)] = s[k];
                m[(j, i)] = s[k];
            }
            strains.push(e);
            stresses.push(Stress(m));
        }
        let plain = elastic_tensor_from_strains(&strains, &stresses, None, &ElasticConfig::default()).unwrap();
        assert!((plain.tensor.max_asymmetry() - 0.1).abs() < 1e-9);

        let config = ElasticConfig {
            symmetrize: true,
            ..ElasticConfig::default()
        };
        let sym = elastic_tensor_from_strains(&strains, &stresses, None, &config).unwrap();
        assert!(sym.tensor.is_symmetric(1e-12));
        assert_eq!(sym.residuals_sum, plain.residuals_sum);
    }
}
