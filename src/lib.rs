//! `elastic-fit` library crate.
//!
//! The binary (`elastic`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline can be driven by any stress evaluator that implements
//!   [`deform::StressEvaluator`]
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod deform;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod tensor;

pub use app::pipeline::{ElasticityCalc, TensorFit, elastic_tensor_from_strains};
pub use domain::{ElasticConfig, ElasticResult, ElasticWarning, StrainState, Structure};
pub use error::{ElasticError, EvaluatorError};
pub use tensor::{ElasticModuli, ElasticTensor};
