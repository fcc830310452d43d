//! Input/output helpers.
//!
//! - structure, tensor and config JSON (`files`)
//! - externally computed strain/stress observations (`observations`)
//! - result reports (`export`)

pub mod export;
pub mod files;
pub mod observations;

pub use export::*;
pub use files::*;
pub use observations::*;
