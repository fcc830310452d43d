//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - crystal structures, deformations, strains and stresses
//! - strain-state classification (`StrainState`)
//! - run configuration (`ElasticConfig`) and outputs (`ElasticResult`, `ElasticWarning`)

pub mod types;

pub use types::*;
