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

use crate::waveform::ThreePhaseSeries;

/// Breaker operation derived from the trip decision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BreakerOperation {
    /// Sample index at which the poles part. `None` when the relay never
    /// tripped. May point beyond the study horizon, in which case the
    /// interruption never completes within the observed window.
    pub open_idx: Option<usize>,
}

impl BreakerOperation {
    pub fn opened_within(&self, samples: usize) -> bool {
        matches!(self.open_idx, Some(idx) if idx < samples)
    }
}

/// Open the breaker a fixed mechanism delay after the trip order.
///
/// All three phases are interrupted together: currents are zeroed from
/// `trip_idx + delay_samples` onward. When that index lands beyond the
/// horizon the waveforms are left intact, but the would-be opening index is
/// still reported for the event log. A no-trip decision passes the currents
/// through untouched.
pub fn apply_breaker(
    currents: ThreePhaseSeries,
    trip_idx: Option<usize>,
    delay_samples: usize,
) -> (ThreePhaseSeries, BreakerOperation) {
    let Some(trip_idx) = trip_idx else {
        return (currents, BreakerOperation { open_idx: None });
    };

    let open_idx = trip_idx + delay_samples;
    let mut interrupted = currents;
    if open_idx < interrupted.len() {
        for phase in interrupted.phases_mut() {
            for sample in &mut phase[open_idx..] {
                *sample = 0.0;
            }
        }
    }

    (
        interrupted,
        BreakerOperation {
            open_idx: Some(open_idx),
        },
    )
}
