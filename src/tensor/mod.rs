//! Elastic tensor assembly and derived moduli.
//!
//! - `elastic`: the 6×6 Voigt stiffness tensor, zeroing and symmetry diagnostics
//! - `moduli`: Voigt/Reuss/Hill averages and Young's modulus

pub mod elastic;
pub mod moduli;

pub use elastic::*;
pub use moduli::*;
