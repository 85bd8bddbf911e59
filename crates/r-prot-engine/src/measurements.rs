//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use std::f64::consts::PI;

use num_complex::Complex64;

use crate::waveform::ThreePhaseSeries;

/// Bias added to denominators so near-zero currents never divide to infinity.
pub const DIVISION_EPS: f64 = 1e-6;

/// Sliding one-window RMS magnitude of a sampled signal.
///
/// `rms[i]` is the root-mean-square of `signal[i-window..i]` for `i ≥ window`
/// and zero before that: the estimator is causal and warms up from zero
/// rather than back-filling history it does not have.
pub fn windowed_rms(signal: &[f64], window: usize) -> Vec<f64> {
    let mut rms = vec![0.0; signal.len()];
    if window == 0 {
        return rms;
    }
    for i in window..signal.len() {
        let sum_sq: f64 = signal[i - window..i].iter().map(|s| s * s).sum();
        rms[i] = (sum_sq / window as f64).sqrt();
    }
    rms
}

/// Sample-wise zero-sequence current `(Ia + Ib + Ic) / 3`.
pub fn zero_sequence(currents: &ThreePhaseSeries) -> Vec<f64> {
    currents
        .a
        .iter()
        .zip(&currents.b)
        .zip(&currents.c)
        .map(|((&ia, &ib), &ic)| (ia + ib + ic) / 3.0)
        .collect()
}

/// Sample-wise negative-sequence magnitude `|(Ia + a²·Ib + a·Ic) / 3|`.
///
/// Instantaneous real samples are substituted straight into the complex
/// symmetrical-component transform. That shortcut is only representative
/// near steady state; it is not a phasor decomposition. Notably, a balanced
/// positive-sequence set of amplitude `A` reads `A/2` here, so the channel
/// is observed rather than used for discrimination.
pub fn negative_sequence(currents: &ThreePhaseSeries) -> Vec<f64> {
    let a = Complex64::from_polar(1.0, 2.0 * PI / 3.0);
    let a2 = a * a;
    currents
        .a
        .iter()
        .zip(&currents.b)
        .zip(&currents.c)
        .map(|((&ia, &ib), &ic)| {
            let neg = (Complex64::new(ia, 0.0) + a2 * ib + a * ic) / 3.0;
            neg.norm()
        })
        .collect()
}

/// Apparent impedance seen by the relay, `Z[i] = Vrms[i] / (Irms[i] + ε)`.
pub fn apparent_impedance(voltage_rms: &[f64], current_rms: &[f64]) -> Vec<f64> {
    voltage_rms
        .iter()
        .zip(current_rms)
        .map(|(&v, &i)| v / (i + DIVISION_EPS))
        .collect()
}
