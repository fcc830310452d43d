//! Voigt-notation conversions.
//!
//! Index map (0-based): `0 = xx`, `1 = yy`, `2 = zz`, `3 = yz`, `4 = xz`, `5 = xy`.
//!
//! - strains carry engineering shear (`γ = 2ε`) in components 3..6
//! - stresses carry the plain tensor component
//! - rank-4 elastic tensors map `C_ijkl ↔ C_(ij)(kl)` with no extra factors

use nalgebra::{Matrix3, Matrix6, Vector6};

/// Full rank-4 tensor `T[i][j][k][l]`.
pub type FullTensor = [[[[f64; 3]; 3]; 3]; 3];

/// Tensor index pairs in Voigt order.
pub const VOIGT_PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (1, 2), (0, 2), (0, 1)];

/// Voigt index of the tensor index pair `(i, j)` (order-independent).
pub fn voigt_index(i: usize, j: usize) -> usize {
    match (i.min(j), i.max(j)) {
        (0, 0) => 0,
        (1, 1) => 1,
        (2, 2) => 2,
        (1, 2) => 3,
        (0, 2) => 4,
        (0, 1) => 5,
        _ => panic!("tensor index out of range: ({i}, {j})"),
    }
}

pub fn mat3_from_rows(rows: &[[f64; 3]; 3]) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| rows[i][j])
}

pub fn mat3_to_rows(m: &Matrix3<f64>) -> [[f64; 3]; 3] {
    std::array::from_fn(|i| std::array::from_fn(|j| m[(i, j)]))
}

pub fn mat6_from_rows(rows: &[[f64; 6]; 6]) -> Matrix6<f64> {
    Matrix6::from_fn(|i, j| rows[i][j])
}

pub fn mat6_to_rows(m: &Matrix6<f64>) -> [[f64; 6]; 6] {
    std::array::from_fn(|i| std::array::from_fn(|j| m[(i, j)]))
}

/// Symmetric strain tensor to Voigt vector (shear components doubled).
pub fn strain_to_voigt(e: &Matrix3<f64>) -> Vector6<f64> {
    Vector6::from_fn(|v, _| {
        let (i, j) = VOIGT_PAIRS[v];
        if i == j { e[(i, j)] } else { e[(i, j)] + e[(j, i)] }
    })
}

/// Stress tensor to Voigt vector.
///
/// Evaluators do not promise a symmetric tensor, so each off-diagonal pair is averaged.
pub fn stress_to_voigt(s: &Matrix3<f64>) -> Vector6<f64> {
    Vector6::from_fn(|v, _| {
        let (i, j) = VOIGT_PAIRS[v];
        0.5 * (s[(i, j)] + s[(j, i)])
    })
}

/// Expand a 6×6 Voigt matrix to the full rank-4 tensor.
pub fn voigt_to_full(c: &Matrix6<f64>) -> FullTensor {
    let mut t = [[[[0.0; 3]; 3]; 3]; 3];
    for (i, ti) in t.iter_mut().enumerate() {
        for (j, tij) in ti.iter_mut().enumerate() {
            for (k, tijk) in tij.iter_mut().enumerate() {
                for (l, v) in tijk.iter_mut().enumerate() {
                    *v = c[(voigt_index(i, j), voigt_index(k, l))];
                }
            }
        }
    }
    t
}

/// Contract a full rank-4 tensor to its 6×6 Voigt matrix.
///
/// Uses the representative index pairs in [`VOIGT_PAIRS`]; minor-symmetric partners are
/// not averaged.
pub fn full_to_voigt(t: &FullTensor) -> Matrix6<f64> {
    Matrix6::from_fn(|a, b| {
        let (i, j) = VOIGT_PAIRS[a];
        let (k, l) = VOIGT_PAIRS[b];
        t[i][j][k][l]
    })
}
