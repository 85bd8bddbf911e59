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

use r_prot_common::time::sample_time;

/// Uniformly sampled waveforms for phases A, B, C.
///
/// Every pipeline stage consumes a value and hands a new one to its
/// successor; no stage aliases another stage's samples. All three phase
/// vectors carry the same length for the whole study horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreePhaseSeries {
    pub a: Vec<f64>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,
}

impl ThreePhaseSeries {
    pub fn zeros(len: usize) -> Self {
        Self {
            a: vec![0.0; len],
            b: vec![0.0; len],
            c: vec![0.0; len],
        }
    }

    /// Shared sample count of the three phases.
    pub fn len(&self) -> usize {
        self.a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Phase slices in A, B, C order.
    pub fn phases(&self) -> [&[f64]; 3] {
        [&self.a, &self.b, &self.c]
    }

    /// Mutable phase slices in A, B, C order.
    pub fn phases_mut(&mut self) -> [&mut Vec<f64>; 3] {
        [&mut self.a, &mut self.b, &mut self.c]
    }
}

/// Timestamp axis for `samples` points at `sampling_hz`.
pub fn time_axis(sampling_hz: u32, samples: usize) -> Vec<f64> {
    (0..samples).map(|i| sample_time(i, sampling_hz)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros_carry_uniform_length() {
        let series = ThreePhaseSeries::zeros(16);
        assert_eq!(series.len(), 16);
        for phase in series.phases() {
            assert_eq!(phase.len(), 16);
            assert!(phase.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn time_axis_is_uniform() {
        let t = time_axis(5000, 5);
        assert_eq!(t.len(), 5);
        assert!((t[0]).abs() < 1e-12);
        assert!((t[4] - 4.0 / 5000.0).abs() < 1e-12);
    }
}
