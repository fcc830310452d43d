//! Elastic-tensor fitting stages.
//!
//! Responsibilities:
//!
//! - evaluate stresses for every deformed structure (`sampler`)
//! - group strain/stress pairs by strain direction (`grouping`)
//! - fit one straight line per (strain state, stress component) (`fitter`)

pub mod fitter;
pub mod grouping;
pub mod sampler;

pub use fitter::*;
pub use grouping::*;
pub use sampler::*;
