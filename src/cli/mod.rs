//! Command-line parsing for the elastic-tensor fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "elastic", version, about = "Elastic tensors from finite-strain stress fits")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write the independent-strain deformation set for a structure (for an external evaluator).
    Deform(DeformArgs),
    /// Fit the elastic tensor from externally computed stresses.
    Fit(FitArgs),
    /// Run the full calculation against a linear-elastic reference model.
    Synth(SynthArgs),
    /// Print Voigt-Reuss-Hill moduli for a 6×6 elastic tensor.
    Moduli(ModuliArgs),
}

/// Options shared by every command that builds an `ElasticConfig`.
///
/// Flags override values loaded from `--config`.
#[derive(Debug, Args, Clone, Default)]
pub struct ConfigArgs {
    /// JSON file with any subset of the configuration fields.
    #[arg(long, value_name = "JSON")]
    pub config: Option<PathBuf>,

    /// Normal strain amplitudes (comma separated).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub norm_strains: Option<Vec<f64>>,

    /// Shear strain amplitudes (comma separated).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub shear_strains: Option<Vec<f64>>,

    /// Do not relax the structure before deforming it.
    #[arg(long)]
    pub no_relax: bool,

    /// Force convergence threshold for relaxation.
    #[arg(long)]
    pub fmax: Option<f64>,

    /// Add the equilibrium (zero-strain) stress to every fit.
    #[arg(long)]
    pub use_equilibrium: bool,

    /// Zero tensor entries with magnitude below this.
    #[arg(long)]
    pub tol: Option<f64>,

    /// Symmetrize the fitted tensor as (C + Cᵀ)/2.
    #[arg(long)]
    pub symmetrize: bool,
}

#[derive(Debug, Args, Clone)]
pub struct DeformArgs {
    /// Structure JSON.
    #[arg(long, value_name = "JSON")]
    pub structure: PathBuf,

    /// Output file (defaults to stdout).
    #[arg(long, value_name = "JSON")]
    pub out: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Observation JSON (deformations + stresses).
    #[arg(long, value_name = "JSON")]
    pub observations: PathBuf,

    /// Export the result report to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    /// Structure JSON (also the reference cell of the model).
    #[arg(long, value_name = "JSON")]
    pub structure: PathBuf,

    /// 6×6 stiffness matrix JSON used by the reference model.
    #[arg(long, value_name = "JSON")]
    pub stiffness: PathBuf,

    /// Standard deviation of Gaussian noise added to each stress component.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Export the result report to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ModuliArgs {
    /// 6×6 elastic tensor JSON.
    #[arg(long, value_name = "JSON")]
    pub tensor: PathBuf,
}
