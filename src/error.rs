//! Error types.
//!
//! - `ElasticError` is the library error returned by every fallible operation.
//! - `AppError` is what the `elastic` binary reports: a message plus a process exit code.

use thiserror::Error;

use crate::domain::StrainState;

/// Opaque failure raised by an external collaborator (relaxer or stress evaluator).
///
/// These are passed through untouched; the core never wraps their message or retries.
pub type EvaluatorError = Box<dyn std::error::Error + Send + Sync>;

/// Errors produced while computing an elastic tensor.
#[derive(Error, Debug)]
pub enum ElasticError {
    /// One or more of the six independent strain states has no observations.
    #[error("Missing independent strain states: {}", format_states(.0))]
    MissingStrainStates(Vec<StrainState>),

    /// A derived quantity is undefined (singular tensor, `3K + G = 0`, ...).
    #[error("numeric domain error: {0}")]
    NumericDomain(String),

    /// Failure reported by the relaxer or stress evaluator.
    #[error("{0}")]
    Evaluator(EvaluatorError),

    /// Invalid configuration or malformed input data.
    #[error("invalid input: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ElasticError {
    /// Exit code used by the binary for this error class.
    pub fn exit_code(&self) -> u8 {
        match self {
            ElasticError::Config(_) | ElasticError::Io(_) | ElasticError::Json(_) => 2,
            ElasticError::MissingStrainStates(_) => 3,
            ElasticError::NumericDomain(_) => 4,
            ElasticError::Evaluator(_) => 5,
        }
    }
}

fn format_states(states: &[StrainState]) -> String {
    states
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ElasticError> for AppError {
    fn from(err: ElasticError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
