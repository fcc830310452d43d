//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during deformation, sampling and fitting
//! - exported to JSON
//! - reloaded later (structures, observation sets, tensors)
//!
//! Voigt order throughout the crate is `xx, yy, zz, yz, xz, xy`.

use std::fmt;

use nalgebra::{Matrix3, Vector6};
use serde::{Deserialize, Serialize};

use crate::error::ElasticError;
use crate::math::{mat3_from_rows, mat3_to_rows, stress_to_voigt, strain_to_voigt};
use crate::tensor::{ElasticModuli, ElasticTensor};

/// Voigt component labels in index order.
pub const VOIGT_LABELS: [&str; 6] = ["xx", "yy", "zz", "yz", "xz", "xy"];

/// Strain components with magnitude at or below this are treated as exactly zero
/// when classifying strain directions.
pub const STRAIN_ZERO_TOL: f64 = 1e-10;

/// Resolution of the quantized direction key (two directions whose normalized
/// components agree to this precision share a strain state).
const KEY_RESOLUTION: f64 = 1e-6;

/// One atomic site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub species: String,
    pub frac_coords: [f64; 3],
}

/// A periodic crystal structure: lattice row vectors plus sites in fractional coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    /// Lattice vectors `a`, `b`, `c` as rows.
    pub lattice: [[f64; 3]; 3],
    pub sites: Vec<Site>,
}

impl Structure {
    pub fn new(lattice: Matrix3<f64>, sites: Vec<Site>) -> Self {
        Self {
            lattice: mat3_to_rows(&lattice),
            sites,
        }
    }

    pub fn lattice_matrix(&self) -> Matrix3<f64> {
        mat3_from_rows(&self.lattice)
    }

    /// Cell volume (absolute value of the lattice determinant).
    pub fn volume(&self) -> f64 {
        self.lattice_matrix().determinant().abs()
    }

    /// Apply a deformation gradient to every lattice vector (`a' = F·a`).
    ///
    /// Fractional coordinates are carried over unchanged.
    pub fn deformed(&self, deformation: &Deformation) -> Structure {
        let lattice = self.lattice_matrix() * deformation.0.transpose();
        Structure::new(lattice, self.sites.clone())
    }
}

/// A deformation gradient `F` (3×3 linear map applied to lattice vectors).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deformation(pub Matrix3<f64>);

impl Deformation {
    /// Green-Lagrange strain `E = ½(FᵀF − I)`.
    pub fn green_lagrange_strain(&self) -> Strain {
        let f = &self.0;
        Strain((f.transpose() * f - Matrix3::identity()) * 0.5)
    }
}

/// Symmetric strain tensor (full 3×3 form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strain(pub Matrix3<f64>);

impl Strain {
    /// Strain with a single (symmetric) tensor component set to `amount`.
    ///
    /// For `i != j` both `(i, j)` and `(j, i)` are set, so the Voigt shear component
    /// is `2 * amount`.
    pub fn from_index_amount(i: usize, j: usize, amount: f64) -> Self {
        let mut m = Matrix3::zeros();
        m[(i, j)] = amount;
        m[(j, i)] = amount;
        Self(m)
    }

    /// Voigt vector with engineering shear components.
    pub fn voigt(&self) -> Vector6<f64> {
        strain_to_voigt(&self.0)
    }

    /// Upper-triangular deformation gradient `F` with `FᵀF = 2E + I`.
    pub fn deformation(&self) -> Result<Deformation, ElasticError> {
        let ftf = self.0 * 2.0 + Matrix3::identity();
        let chol = ftf.cholesky().ok_or_else(|| {
            ElasticError::Config(format!(
                "strain {:?} does not correspond to a real deformation (2E + I not positive definite)",
                mat3_to_rows(&self.0)
            ))
        })?;
        Ok(Deformation(chol.l().transpose()))
    }
}

/// Stress tensor as returned by an evaluator (not necessarily symmetric).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stress(pub Matrix3<f64>);

impl Stress {
    /// Voigt vector; off-diagonal pairs are averaged.
    pub fn voigt(&self) -> Vector6<f64> {
        stress_to_voigt(&self.0)
    }
}

/// Normalized direction of a strain in Voigt space.
///
/// `Canonical(i)` is the unit direction along Voigt axis `i`; anything else is
/// kept under its quantized direction key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrainState {
    Canonical(usize),
    Other([i64; 6]),
}

impl StrainState {
    /// The six independent strain states in Voigt order.
    pub const INDEPENDENT: [StrainState; 6] = [
        StrainState::Canonical(0),
        StrainState::Canonical(1),
        StrainState::Canonical(2),
        StrainState::Canonical(3),
        StrainState::Canonical(4),
        StrainState::Canonical(5),
    ];

    /// Classify a Voigt strain by its direction.
    ///
    /// Components at or below [`STRAIN_ZERO_TOL`] are dropped, the rest are divided by
    /// the smallest-magnitude remaining component. The relative sign between
    /// components is kept, so `(1, -1, 0, ..)` and `(1, 1, 0, ..)` differ, while a
    /// strain and its negative share a state. The zero strain has an all-zero key.
    pub fn classify(voigt: &Vector6<f64>) -> StrainState {
        let key = direction_key(voigt);
        let support: Vec<usize> = (0..6).filter(|&i| key[i] != 0).collect();
        match support.as_slice() {
            [axis] => StrainState::Canonical(*axis),
            _ => StrainState::Other(key),
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, StrainState::Canonical(_))
    }

    /// Normalized direction vector.
    pub fn direction(&self) -> [f64; 6] {
        match self {
            StrainState::Canonical(axis) => {
                let mut d = [0.0; 6];
                d[*axis] = 1.0;
                d
            }
            StrainState::Other(key) => key.map(|k| k as f64 * KEY_RESOLUTION),
        }
    }
}

impl fmt::Display for StrainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = self
            .direction()
            .iter()
            .map(|v| format!("{v}"))
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            StrainState::Canonical(axis) => write!(f, "{} ({dir})", VOIGT_LABELS[*axis]),
            StrainState::Other(_) => write!(f, "({dir})"),
        }
    }
}

fn direction_key(voigt: &Vector6<f64>) -> [i64; 6] {
    let scale = voigt
        .iter()
        .copied()
        .filter(|v| v.abs() > STRAIN_ZERO_TOL)
        .min_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal));

    let mut key = [0_i64; 6];
    let Some(scale) = scale else {
        return key;
    };
    for (k, v) in key.iter_mut().zip(voigt.iter()) {
        if v.abs() > STRAIN_ZERO_TOL {
            *k = (v / scale / KEY_RESOLUTION).round() as i64;
        }
    }
    key
}

/// Immutable configuration for one elastic-tensor calculation.
///
/// Missing fields in a JSON config take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElasticConfig {
    /// Strain amplitudes applied to each normal mode (xx, yy, zz).
    pub norm_strains: Vec<f64>,
    /// Strain amplitudes applied to each shear mode (xy, xz, yz).
    pub shear_strains: Vec<f64>,
    /// Relax the input structure before deforming it.
    pub relax_structure: bool,
    /// Force convergence threshold handed to the relaxer.
    pub fmax: f64,
    /// Evaluate the undeformed structure and add it as a zero-strain point to every fit.
    pub use_equilibrium: bool,
    /// Tensor entries with magnitude below this are set to exactly zero.
    pub tol: f64,
    /// Replace `C` by `(C + Cᵀ)/2` before zeroing. Off by default.
    pub symmetrize: bool,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            norm_strains: vec![0.001, 0.003, 0.005, 0.01],
            shear_strains: vec![0.001, 0.003, 0.005, 0.01],
            relax_structure: true,
            fmax: 0.1,
            use_equilibrium: false,
            tol: 1e-7,
            symmetrize: false,
        }
    }
}

impl ElasticConfig {
    pub fn validate(&self) -> Result<(), ElasticError> {
        check_amplitudes("norm_strains", &self.norm_strains)?;
        check_amplitudes("shear_strains", &self.shear_strains)?;
        if !(self.fmax.is_finite() && self.fmax > 0.0) {
            return Err(ElasticError::Config(format!(
                "fmax must be finite and > 0, got {}",
                self.fmax
            )));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(ElasticError::Config(format!(
                "tol must be finite and >= 0, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

fn check_amplitudes(name: &str, values: &[f64]) -> Result<(), ElasticError> {
    if values.is_empty() {
        return Err(ElasticError::Config(format!("{name} must contain at least one amplitude")));
    }
    if let Some(bad) = values
        .iter()
        .find(|v| !v.is_finite() || v.abs() <= STRAIN_ZERO_TOL)
    {
        return Err(ElasticError::Config(format!(
            "{name} must be finite and nonzero, got {bad}"
        )));
    }
    Ok(())
}

/// Non-fatal advisories produced during a calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElasticWarning {
    /// Observations along non-independent strain directions were present and ignored.
    ExtraStrainStates { states: Vec<StrainState> },
}

impl fmt::Display for ElasticWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElasticWarning::ExtraStrainStates { states } => write!(
                f,
                "Extra strain states in strain-stress pairs are neglected in independent strain fitting ({} state(s))",
                states.len()
            ),
        }
    }
}

/// Output of one `calc()` run.
#[derive(Debug, Clone)]
pub struct ElasticResult {
    pub elastic_tensor: ElasticTensor,
    pub shear_modulus_vrh: f64,
    pub bulk_modulus_vrh: f64,
    pub youngs_modulus: f64,
    /// Sum of squared residuals over all 36 linear fits.
    pub residuals_sum: f64,
    /// The (possibly relaxed) structure that was deformed.
    pub structure: Structure,
    pub moduli: ElasticModuli,
    pub warnings: Vec<ElasticWarning>,
}
