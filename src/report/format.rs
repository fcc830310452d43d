//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{ElasticWarning, VOIGT_LABELS};
use crate::tensor::{ElasticModuli, ElasticTensor};

/// Format the full run summary (tensor + moduli + fit diagnostics).
pub fn format_summary(
    tensor: &ElasticTensor,
    moduli: &ElasticModuli,
    residuals_sum: f64,
    warnings: &[ElasticWarning],
) -> String {
    let mut out = String::new();

    out.push_str("=== elastic - independent-strain elastic tensor ===\n");
    out.push_str("\nElastic tensor (Voigt, evaluator stress units):\n");
    out.push_str(&format_tensor(tensor));

    out.push_str(&format!("\nResiduals (sum of squares): {residuals_sum:.6e}\n"));
    out.push_str(&format!("Max asymmetry |C_ij - C_ji|: {:.3e}\n", tensor.max_asymmetry()));

    out.push('\n');
    out.push_str(&format_moduli(moduli));

    if !warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

/// 6×6 table with Voigt labels.
pub fn format_tensor(tensor: &ElasticTensor) -> String {
    let c = tensor.voigt();
    let mut out = String::new();
    out.push_str("      ");
    for label in VOIGT_LABELS {
        out.push_str(&format!("{label:>13}"));
    }
    out.push('\n');
    for (i, label) in VOIGT_LABELS.iter().enumerate() {
        out.push_str(&format!("{label:<6}"));
        for j in 0..6 {
            out.push_str(&format!("{:>13.6}", c[(i, j)]));
        }
        out.push('\n');
    }
    out
}

pub fn format_moduli(m: &ElasticModuli) -> String {
    let mut out = String::new();
    out.push_str("Moduli:          Voigt        Reuss          VRH\n");
    out.push_str(&format!(
        "- bulk K   {:>12.6} {:>12.6} {:>12.6}\n",
        m.k_voigt, m.k_reuss, m.k_vrh
    ));
    out.push_str(&format!(
        "- shear G  {:>12.6} {:>12.6} {:>12.6}\n",
        m.g_voigt, m.g_reuss, m.g_vrh
    ));
    out.push_str(&format!("- Young's modulus E: {:.6}\n", m.youngs_modulus));
    out.push_str(&format!("- Poisson ratio:     {:.4}\n", m.homogeneous_poisson));
    out.push_str(&format!("- universal anisotropy A_U: {:.4}\n", m.universal_anisotropy));
    out
}
