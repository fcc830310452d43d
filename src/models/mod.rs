//! Reference stress models.
//!
//! Real force fields live outside this crate. The models here implement the
//! collaborator traits so that the pipeline can be exercised end to end (the `synth`
//! command and the tests).

pub mod linear;

pub use linear::*;
