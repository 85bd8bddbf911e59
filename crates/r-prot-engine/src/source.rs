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

use r_prot_common::config::SourceConfig;
use r_prot_common::time::sample_count;

use crate::errors::{EngineError, Result};
use crate::waveform::{time_axis, ThreePhaseSeries};

/// Synthesize an ideal balanced three-phase source.
///
/// Phases sit at 0°, −120°, +120° with peak amplitude `voltage_rms_v·√2`.
/// The sampling rate should resolve the fundamental with at least ~10
/// samples per cycle; configuration validation enforces the supported
/// rate/duration combinations before a study reaches this point.
pub fn balanced_three_phase(config: &SourceConfig) -> Result<(Vec<f64>, ThreePhaseSeries)> {
    if config.voltage_rms_v <= 0.0 {
        return Err(EngineError::InvalidWaveform(format!(
            "RMS voltage {} must be positive",
            config.voltage_rms_v
        )));
    }
    if config.frequency_hz <= 0.0 {
        return Err(EngineError::InvalidWaveform(format!(
            "frequency {} must be positive",
            config.frequency_hz
        )));
    }
    if config.duration_s <= 0.0 {
        return Err(EngineError::InvalidWaveform(format!(
            "duration {} must be positive",
            config.duration_s
        )));
    }

    let samples = sample_count(config.sampling_hz, config.duration_s);
    let t = time_axis(config.sampling_hz, samples);
    let omega = 2.0 * PI * config.frequency_hz;
    let peak = config.voltage_rms_v * 2.0_f64.sqrt();
    let offset = 2.0 * PI / 3.0;

    let mut voltages = ThreePhaseSeries::zeros(samples);
    for (i, &time) in t.iter().enumerate() {
        let angle = omega * time;
        voltages.a[i] = peak * angle.sin();
        voltages.b[i] = peak * (angle - offset).sin();
        voltages.c[i] = peak * (angle + offset).sin();
    }

    Ok((t, voltages))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SourceConfig {
        SourceConfig {
            voltage_rms_v: 230.0,
            frequency_hz: 50.0,
            duration_s: 0.5,
            sampling_hz: 5000,
        }
    }

    #[test]
    fn produces_full_horizon() {
        let (t, v) = balanced_three_phase(&config()).unwrap();
        assert_eq!(t.len(), 2500);
        assert_eq!(v.len(), 2500);
    }

    #[test]
    fn peak_amplitude_is_sqrt2_rms() {
        let (_, v) = balanced_three_phase(&config()).unwrap();
        let peak = v.a.iter().cloned().fold(f64::MIN, f64::max);
        assert!((peak - 230.0 * 2.0_f64.sqrt()).abs() < 0.5);
    }

    #[test]
    fn phases_are_displaced_by_a_third_of_a_cycle() {
        let (_, v) = balanced_three_phase(&config()).unwrap();
        // 100 samples per cycle at 5 kHz / 50 Hz; B lags A by a third.
        let third = 100 / 3;
        for i in 500..600 {
            assert!((v.b[i] - v.a[i - third]).abs() < 10.0);
        }
    }

    #[test]
    fn rejects_non_positive_parameters() {
        let mut bad = config();
        bad.voltage_rms_v = 0.0;
        assert!(balanced_three_phase(&bad).is_err());

        let mut bad = config();
        bad.frequency_hz = -50.0;
        assert!(balanced_three_phase(&bad).is_err());

        let mut bad = config();
        bad.duration_s = 0.0;
        assert!(balanced_three_phase(&bad).is_err());
    }
}
