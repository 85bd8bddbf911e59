//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use serde::{Deserialize, Serialize};

use r_prot_common::config::LineConfig;

/// Estimated against actual fault position, as percent of line length and km.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultLocationEstimate {
    pub estimated_pct: f64,
    pub estimated_km: f64,
    pub actual_pct: f64,
    pub actual_km: f64,
    pub error_pct: f64,
}

/// Fault position as a percentage of the protected line.
///
/// The ratio of trip-time apparent impedance to total line impedance maps
/// directly to electrical distance; the estimate saturates at 100% and a
/// zero line impedance yields zero rather than a division error.
pub fn estimate_location_pct(z_measured_ohm: f64, z_line_ohm: f64) -> f64 {
    if z_line_ohm == 0.0 {
        return 0.0;
    }
    ((z_measured_ohm / z_line_ohm) * 100.0).min(100.0)
}

/// Package the estimator output next to the configured actual location.
pub fn locate_fault(
    z_measured_ohm: f64,
    line: &LineConfig,
    actual_pct: f64,
) -> FaultLocationEstimate {
    let estimated_pct = estimate_location_pct(z_measured_ohm, line.impedance_ohm);
    FaultLocationEstimate {
        estimated_pct,
        estimated_km: (estimated_pct / 100.0) * line.length_km,
        actual_pct,
        actual_km: (actual_pct / 100.0) * line.length_km,
        error_pct: (estimated_pct - actual_pct).abs(),
    }
}
