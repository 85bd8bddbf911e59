//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use r_prot_common::config::LineConfig;

use crate::waveform::ThreePhaseSeries;

/// Derive per-phase line currents from the (possibly faulted) voltages.
///
/// Each phase follows the first-order series R-L model `L·dI/dt = V − R·I`,
/// discretized with explicit forward Euler:
///
/// ```text
/// I[i] = I[i-1] + dt·(V[i] − R·I[i-1])/L,   I[0] = 0
/// ```
///
/// The recurrence is strictly causal, so it can run over the materialized
/// array or sample-by-sample. Explicit Euler is only stable for
/// `dt·R/L < 2`; that is a precondition on the configured rate/line
/// combination, not a runtime check.
pub fn line_currents(
    voltages: &ThreePhaseSeries,
    line: &LineConfig,
    sampling_hz: u32,
) -> ThreePhaseSeries {
    let dt = 1.0 / f64::from(sampling_hz);
    ThreePhaseSeries {
        a: phase_current(&voltages.a, line.resistance_ohm, line.inductance_h, dt),
        b: phase_current(&voltages.b, line.resistance_ohm, line.inductance_h, dt),
        c: phase_current(&voltages.c, line.resistance_ohm, line.inductance_h, dt),
    }
}

fn phase_current(voltage: &[f64], resistance: f64, inductance: f64, dt: f64) -> Vec<f64> {
    let mut current = vec![0.0; voltage.len()];
    for i in 1..voltage.len() {
        current[i] = current[i - 1] + dt * (voltage[i] - resistance * current[i - 1]) / inductance;
    }
    current
}
