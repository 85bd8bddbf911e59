//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::waveform::ThreePhaseSeries;

/// Recloser lifecycle. A study visits at most one full cycle:
/// `Closed → Open → RecloseAttempt → {Closed, Lockout}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecloserState {
    Closed,
    Open,
    RecloseAttempt,
    Lockout,
}

/// Terminal verdict of the single-shot reclose sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecloseStatus {
    RecloseSuccess,
    Lockout,
}

impl fmt::Display for RecloseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecloseStatus::RecloseSuccess => "RECLOSE SUCCESS",
            RecloseStatus::Lockout => "LOCKOUT",
        };
        f.write_str(label)
    }
}

/// What the reclose sequence concluded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecloseOutcome {
    /// Sample index of the reclose attempt; `None` when the dead time ran
    /// past the study horizon and no attempt could be observed.
    pub reclose_idx: Option<usize>,
    pub status: RecloseStatus,
}

/// Single-shot auto-reclose controller.
///
/// After the breaker opens, the controller waits the configured dead time,
/// re-energizes by replaying the head of the interrupted waveform from the
/// reclose instant, and judges fault persistence by the current magnitude
/// at exactly that instant. A persistent fault re-opens the breaker for
/// good; there is no second attempt.
#[derive(Debug, Clone)]
pub struct Recloser {
    dead_time_samples: usize,
    persistence_threshold_a: f64,
    state: RecloserState,
}

impl Recloser {
    pub fn new(dead_time_samples: usize, persistence_threshold_a: f64) -> Self {
        Self {
            dead_time_samples,
            persistence_threshold_a,
            state: RecloserState::Closed,
        }
    }

    pub fn state(&self) -> RecloserState {
        self.state
    }

    /// Run the reclose sequence over the breaker-output currents.
    ///
    /// With no breaker operation the controller stays `Closed` and reports
    /// no outcome. Otherwise the currents are returned with the attempt
    /// applied and the outcome captures the attempt index and verdict.
    pub fn run(
        &mut self,
        currents: ThreePhaseSeries,
        open_idx: Option<usize>,
    ) -> (ThreePhaseSeries, Option<RecloseOutcome>) {
        let Some(open_idx) = open_idx else {
            return (currents, None);
        };

        self.state = RecloserState::Open;
        let samples = currents.len();
        let reclose_idx = open_idx + self.dead_time_samples;

        if reclose_idx >= samples {
            // Dead time outlives the horizon: clearance can never be
            // confirmed within the observed window.
            self.state = RecloserState::Lockout;
            debug!(reclose_idx, samples, "reclose attempt beyond horizon");
            return (
                currents,
                Some(RecloseOutcome {
                    reclose_idx: None,
                    status: RecloseStatus::Lockout,
                }),
            );
        }

        self.state = RecloserState::RecloseAttempt;
        let mut restored = currents;
        restore_from_head(&mut restored, reclose_idx);

        let persists = restored
            .phases()
            .iter()
            .any(|phase| phase[reclose_idx].abs() > self.persistence_threshold_a);

        if persists {
            for phase in restored.phases_mut() {
                for sample in &mut phase[reclose_idx..] {
                    *sample = 0.0;
                }
            }
            self.state = RecloserState::Lockout;
            return (
                restored,
                Some(RecloseOutcome {
                    reclose_idx: Some(reclose_idx),
                    status: RecloseStatus::Lockout,
                }),
            );
        }

        self.state = RecloserState::Closed;
        (
            restored,
            Some(RecloseOutcome {
                reclose_idx: Some(reclose_idx),
                status: RecloseStatus::RecloseSuccess,
            }),
        )
    }
}

/// Re-energize from `reclose_idx` with the shifted head of the same signal:
/// `out[reclose_idx + k] = in[k]`.
fn restore_from_head(currents: &mut ThreePhaseSeries, reclose_idx: usize) {
    let samples = currents.len();
    for phase in currents.phases_mut() {
        let head: Vec<f64> = phase[..samples - reclose_idx].to_vec();
        phase[reclose_idx..].copy_from_slice(&head);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> ThreePhaseSeries {
        ThreePhaseSeries {
            a: (0..len).map(|i| i as f64).collect(),
            b: (0..len).map(|i| -(i as f64)).collect(),
            c: (0..len).map(|i| 0.5 * i as f64).collect(),
        }
    }

    #[test]
    fn stays_closed_without_breaker_operation() {
        let mut recloser = Recloser::new(10, 5.0);
        let baseline = ramp(50);
        let (currents, outcome) = recloser.run(baseline.clone(), None);
        assert!(outcome.is_none());
        assert_eq!(recloser.state(), RecloserState::Closed);
        assert_eq!(currents, baseline);
    }

    #[test]
    fn dead_time_past_horizon_locks_out() {
        let mut recloser = Recloser::new(30, 5.0);
        let baseline = ramp(50);
        let (currents, outcome) = recloser.run(baseline.clone(), Some(25));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.reclose_idx, None);
        assert_eq!(outcome.status, RecloseStatus::Lockout);
        assert_eq!(recloser.state(), RecloserState::Lockout);
        assert_eq!(currents, baseline);
    }

    #[test]
    fn reclose_index_is_open_plus_dead_time() {
        let mut recloser = Recloser::new(10, 1e9);
        let (_, outcome) = recloser.run(ramp(50), Some(20));
        assert_eq!(outcome.unwrap().reclose_idx, Some(30));
    }

    #[test]
    fn quiet_restoration_succeeds() {
        // Head starts at zero, so the persistence check sees a dead line.
        let mut recloser = Recloser::new(10, 5.0);
        let (currents, outcome) = recloser.run(ramp(50), Some(20));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.status, RecloseStatus::RecloseSuccess);
        assert_eq!(recloser.state(), RecloserState::Closed);
        // out[30 + k] == in[k]
        assert_eq!(currents.a[30], 0.0);
        assert_eq!(currents.a[35], 5.0);
        assert_eq!(currents.b[49], -19.0);
    }

    #[test]
    fn persistent_fault_locks_out_and_deadlines_the_feeder() {
        let mut recloser = Recloser::new(10, 5.0);
        let mut hot = ramp(50);
        // Make the replayed head carry a large magnitude at the attempt.
        hot.a[0] = 40.0;
        let (currents, outcome) = recloser.run(hot, Some(20));
        let outcome = outcome.unwrap();
        assert_eq!(outcome.status, RecloseStatus::Lockout);
        assert_eq!(outcome.reclose_idx, Some(30));
        assert_eq!(recloser.state(), RecloserState::Lockout);
        for phase in currents.phases() {
            assert!(phase[30..].iter().all(|&s| s == 0.0));
        }
    }
}
