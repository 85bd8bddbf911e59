//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use r_prot_common::config::FaultKind;

use crate::waveform::ThreePhaseSeries;

/// Apply a shunt fault to the source waveforms.
///
/// Affected phases (LG: A; LL: A and B; LLL: all three) are attenuated by
/// `resistance_factor` from `onset_idx` onward. This is a voltage-divider
/// approximation of the fault impedance, not a network solve: the healthy
/// phases are untouched and the attenuation is a flat amplitude scale.
/// Downstream relay pickups are tuned against exactly this model.
///
/// Samples before the onset index are never modified. An onset at or beyond
/// the series length leaves the waveforms intact (the fault never manifests
/// within the horizon); callers validate the onset against the horizon when
/// that is not acceptable.
pub fn inject(
    voltages: ThreePhaseSeries,
    kind: FaultKind,
    onset_idx: usize,
    resistance_factor: f64,
) -> ThreePhaseSeries {
    let mut faulted = voltages;
    match kind {
        FaultKind::LineToGround => {
            attenuate_from(&mut faulted.a, onset_idx, resistance_factor);
        }
        FaultKind::LineToLine => {
            attenuate_from(&mut faulted.a, onset_idx, resistance_factor);
            attenuate_from(&mut faulted.b, onset_idx, resistance_factor);
        }
        FaultKind::ThreePhase => {
            attenuate_from(&mut faulted.a, onset_idx, resistance_factor);
            attenuate_from(&mut faulted.b, onset_idx, resistance_factor);
            attenuate_from(&mut faulted.c, onset_idx, resistance_factor);
        }
    }
    faulted
}

fn attenuate_from(samples: &mut [f64], onset_idx: usize, factor: f64) {
    if onset_idx >= samples.len() {
        return;
    }
    for sample in &mut samples[onset_idx..] {
        *sample *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> ThreePhaseSeries {
        ThreePhaseSeries {
            a: (0..len).map(|i| i as f64).collect(),
            b: (0..len).map(|i| 10.0 + i as f64).collect(),
            c: (0..len).map(|i| 20.0 + i as f64).collect(),
        }
    }

    #[test]
    fn pre_onset_samples_are_bit_identical() {
        let baseline = ramp(50);
        let faulted = inject(baseline.clone(), FaultKind::ThreePhase, 30, 0.01);
        assert_eq!(&faulted.a[..30], &baseline.a[..30]);
        assert_eq!(&faulted.b[..30], &baseline.b[..30]);
        assert_eq!(&faulted.c[..30], &baseline.c[..30]);
    }

    #[test]
    fn post_onset_samples_are_scaled_exactly() {
        let baseline = ramp(50);
        let faulted = inject(baseline.clone(), FaultKind::LineToGround, 10, 0.25);
        for i in 10..50 {
            assert_eq!(faulted.a[i], baseline.a[i] * 0.25);
        }
    }

    #[test]
    fn only_fault_pattern_phases_are_affected() {
        let baseline = ramp(40);

        let lg = inject(baseline.clone(), FaultKind::LineToGround, 0, 0.5);
        assert_eq!(lg.b, baseline.b);
        assert_eq!(lg.c, baseline.c);

        let ll = inject(baseline.clone(), FaultKind::LineToLine, 0, 0.5);
        assert_ne!(ll.a, baseline.a);
        assert_ne!(ll.b, baseline.b);
        assert_eq!(ll.c, baseline.c);
    }

    #[test]
    fn onset_beyond_horizon_is_a_no_op() {
        let baseline = ramp(20);
        let faulted = inject(baseline.clone(), FaultKind::ThreePhase, 20, 0.01);
        assert_eq!(faulted, baseline);
    }

    #[test]
    fn unity_factor_leaves_waveform_intact() {
        let baseline = ramp(20);
        let faulted = inject(baseline.clone(), FaultKind::ThreePhase, 5, 1.0);
        assert_eq!(faulted, baseline);
    }
}
