//! ---
//! prot_section: "01-core-functionality"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Shared primitives and utilities for the study runtime."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use std::time::Duration;

/// Number of samples in a study horizon of `duration_s` seconds at `sampling_hz`.
pub fn sample_count(sampling_hz: u32, duration_s: f64) -> usize {
    (f64::from(sampling_hz) * duration_s).round() as usize
}

/// Simulation timestamp of sample `idx` at `sampling_hz`.
pub fn sample_time(idx: usize, sampling_hz: u32) -> f64 {
    idx as f64 / f64::from(sampling_hz)
}

/// Convert a wall-clock style delay into a whole sample count, truncating.
///
/// Matches the index arithmetic used throughout the pipeline: delays are
/// applied as whole samples, never fractional.
pub fn samples_in(delay: Duration, sampling_hz: u32) -> usize {
    (delay.as_secs_f64() * f64::from(sampling_hz)) as usize
}

/// One-AC-cycle measurement window at the given sampling rate.
pub fn cycle_window(sampling_hz: u32, frequency_hz: f64) -> usize {
    (f64::from(sampling_hz) / frequency_hz).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_matches_horizon() {
        assert_eq!(sample_count(5000, 1.0), 5000);
        assert_eq!(sample_count(2000, 0.5), 1000);
        assert_eq!(sample_count(10000, 1.5), 15000);
    }

    #[test]
    fn cycle_window_covers_one_period() {
        assert_eq!(cycle_window(5000, 50.0), 100);
        assert_eq!(cycle_window(2000, 50.0), 40);
        assert_eq!(cycle_window(10000, 60.0), 167);
    }

    #[test]
    fn delays_truncate_to_whole_samples() {
        assert_eq!(samples_in(Duration::from_millis(40), 5000), 200);
        assert_eq!(samples_in(Duration::from_millis(500), 5000), 2500);
        assert_eq!(samples_in(Duration::from_micros(999), 2000), 1);
    }

    #[test]
    fn timestamps_are_uniform() {
        assert!((sample_time(100, 5000) - 0.02).abs() < 1e-12);
        assert!((sample_time(0, 2000)).abs() < 1e-12);
    }
}
