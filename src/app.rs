//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - builds the run configuration
//! - runs the elastic pipeline (or one of its stages)
//! - prints reports and writes optional exports

use std::path::Path;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, ConfigArgs, DeformArgs, FitArgs, ModuliArgs, SynthArgs};
use crate::deform::{DeformationEnumerator, IndependentDeformations};
use crate::domain::ElasticConfig;
use crate::error::{AppError, ElasticError};
use crate::io::{ElasticReport, write_report_json};
use crate::models::LinearElasticModel;
use crate::tensor::ElasticModuli;

pub mod pipeline;

/// Entry point for the `elastic` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Deform(args) => handle_deform(args),
        Command::Fit(args) => handle_fit(args),
        Command::Synth(args) => handle_synth(args),
        Command::Moduli(args) => handle_moduli(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_deform(args: DeformArgs) -> Result<(), AppError> {
    let config = elastic_config_from_args(&args.config)?;
    let structure = crate::io::read_structure(&args.structure)?;
    let set = IndependentDeformations.deformations(
        &structure,
        &config.norm_strains,
        &config.shear_strains,
    )?;
    info!(count = set.len(), "generated deformation set");

    match &args.out {
        Some(path) => crate::io::write_deformation_set(path, &set)?,
        None => {
            let entries = crate::io::deformation_entries(&set);
            let json = serde_json::to_string_pretty(&entries)
                .map_err(|e| AppError::new(2, format!("Failed to serialize deformation set: {e}")))?;
            println!("{json}");
        }
    }
    Ok(())
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = elastic_config_from_args(&args.config)?;
    let observations = crate::io::read_observations(&args.observations)?;

    let eq_stress = if config.use_equilibrium {
        let eq = observations.equilibrium().ok_or_else(|| {
            AppError::new(
                2,
                "--use-equilibrium requires an `equilibrium_stress` entry in the observation file.",
            )
        })?;
        Some(eq)
    } else {
        None
    };

    let fit = pipeline::elastic_tensor_from_strains(
        &observations.strains(),
        &observations.stress_tensors(),
        eq_stress.as_ref(),
        &config,
    )?;
    let moduli = ElasticModuli::from_tensor(&fit.tensor)?;

    println!(
        "{}",
        crate::report::format_summary(&fit.tensor, &moduli, fit.residuals_sum, &fit.warnings)
    );

    if let Some(path) = &args.export {
        let report = ElasticReport::from_fit(&fit, &moduli, observations.structure.clone(), &config);
        write_export(path, &report)?;
    }
    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = elastic_config_from_args(&args.config)?;
    let structure = crate::io::read_structure(&args.structure)?;
    let stiffness = crate::io::read_tensor(&args.stiffness)?;

    let mut model = LinearElasticModel::new(&structure, *stiffness.voigt())?;
    if args.noise > 0.0 {
        model = model.with_noise(args.noise, args.seed)?;
    }

    let relaxer = model.clone();
    let mut calc = pipeline::ElasticityCalc::new(model, config.clone()).with_relaxer(relaxer);
    let result = calc.calc(&structure)?;

    println!(
        "{}",
        crate::report::format_summary(
            &result.elastic_tensor,
            &result.moduli,
            result.residuals_sum,
            &result.warnings
        )
    );

    if let Some(path) = &args.export {
        write_export(path, &ElasticReport::from_result(&result, &config))?;
    }
    Ok(())
}

fn handle_moduli(args: ModuliArgs) -> Result<(), AppError> {
    let tensor = crate::io::read_tensor(&args.tensor)?;
    let moduli = ElasticModuli::from_tensor(&tensor)?;
    println!("{}", crate::report::format_moduli(&moduli));
    Ok(())
}

fn write_export(path: &Path, report: &ElasticReport) -> Result<(), AppError> {
    write_report_json(path, report)?;
    info!(path = %path.display(), "wrote report");
    Ok(())
}

/// Build the run configuration: `--config` file (or defaults), then flag overrides.
pub fn elastic_config_from_args(args: &ConfigArgs) -> Result<ElasticConfig, ElasticError> {
    let mut config = match &args.config {
        Some(path) => crate::io::read_config(path)?,
        None => ElasticConfig::default(),
    };

    if let Some(norm) = &args.norm_strains {
        config.norm_strains = norm.clone();
    }
    if let Some(shear) = &args.shear_strains {
        config.shear_strains = shear.clone();
    }
    if args.no_relax {
        config.relax_structure = false;
    }
    if let Some(fmax) = args.fmax {
        config.fmax = fmax;
    }
    if args.use_equilibrium {
        config.use_equilibrium = true;
    }
    if let Some(tol) = args.tol {
        config.tol = tol;
    }
    if args.symmetrize {
        config.symmetrize = true;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = ConfigArgs {
            norm_strains: Some(vec![0.01]),
            no_relax: true,
            tol: Some(1e-6),
            ..ConfigArgs::default()
        };
        let config = elastic_config_from_args(&args).unwrap();
        assert_eq!(config.norm_strains, vec![0.01]);
        assert_eq!(config.shear_strains, ElasticConfig::default().shear_strains);
        assert!(!config.relax_structure);
        assert_eq!(config.tol, 1e-6);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let args = ConfigArgs {
            fmax: Some(-1.0),
            ..ConfigArgs::default()
        };
        assert!(matches!(elastic_config_from_args(&args), Err(ElasticError::Config(_))));
    }
}
