//! Mathematical utilities: Voigt conversions and least squares.

pub mod ols;
pub mod voigt;

pub use ols::*;
pub use voigt::*;
