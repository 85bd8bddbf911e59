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

use r_prot_common::config::RelayConfig;
use r_prot_common::time::samples_in;

/// Intentional zone-2 coordination delay.
pub const ZONE2_DELAY: std::time::Duration = std::time::Duration::from_millis(300);
/// Intentional zone-3 coordination delay.
pub const ZONE3_DELAY: std::time::Duration = std::time::Duration::from_millis(1000);

/// Relay verdict on the observed measurements.
///
/// The variants are checked in a fixed priority order; classification is
/// first-match-wins, never a parallel vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// Single line-to-ground fault on phase A.
    PhaseAGround,
    /// Line-to-line fault between phases A and B.
    PhaseAToB,
    /// Symmetric three-phase fault.
    ThreePhase,
    /// Apparent impedance inside the zone-1 reach.
    Zone1,
    /// Apparent impedance inside the zone-2 reach.
    Zone2,
    /// Apparent impedance inside the zone-3 reach.
    Zone3,
    /// Overcurrent scan completed without a qualifying pattern.
    NoFault,
    /// Distance scan completed without entering any zone.
    NoTrip,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Classification::PhaseAGround => "LG Fault (Phase A)",
            Classification::PhaseAToB => "LL Fault (A-B)",
            Classification::ThreePhase => "LLL Fault",
            Classification::Zone1 => "Zone-1 Distance Trip",
            Classification::Zone2 => "Zone-2 Distance Trip",
            Classification::Zone3 => "Zone-3 Distance Trip",
            Classification::NoFault => "No Fault",
            Classification::NoTrip => "No Trip",
        };
        f.write_str(label)
    }
}

/// Outcome of a relay scan: what was seen, and when to trip.
///
/// `trip_idx == None` is the explicit no-trip sentinel; breaker, recloser
/// and locator all treat it as "nothing further happens".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TripDecision {
    pub classification: Classification,
    pub trip_idx: Option<usize>,
}

impl TripDecision {
    pub fn tripped(&self) -> bool {
        self.trip_idx.is_some()
    }
}

/// Instantaneous-overcurrent classification scan.
///
/// Walks the RMS series in sample order and applies three patterns at each
/// index, in order:
///
/// 1. `A && !B && !C` with zero-sequence above pickup → phase-A-to-ground
/// 2. `A && B && !C` with zero-sequence below pickup → phase A-to-B
/// 3. `A && B && C` → three-phase
///
/// The first index matching any pattern decides the whole scan. Only the
/// phase-A and A-B patterns are encoded; B-G, C-G, B-C and friends fall
/// through to `NoFault` deliberately. Extending the pattern table changes
/// relay behaviour that downstream settings are tuned against.
pub fn overcurrent_decision(
    ia_rms: &[f64],
    ib_rms: &[f64],
    ic_rms: &[f64],
    i0_rms: &[f64],
    settings: &RelayConfig,
) -> TripDecision {
    for i in 0..ia_rms.len() {
        let a = ia_rms[i] > settings.pickup_a;
        let b = ib_rms[i] > settings.pickup_a;
        let c = ic_rms[i] > settings.pickup_a;

        if a && !b && !c && i0_rms[i] > settings.zero_seq_pickup_a {
            return TripDecision {
                classification: Classification::PhaseAGround,
                trip_idx: Some(i),
            };
        }

        if a && b && !c && i0_rms[i] < settings.zero_seq_pickup_a {
            return TripDecision {
                classification: Classification::PhaseAToB,
                trip_idx: Some(i),
            };
        }

        if a && b && c {
            return TripDecision {
                classification: Classification::ThreePhase,
                trip_idx: Some(i),
            };
        }
    }

    TripDecision {
        classification: Classification::NoFault,
        trip_idx: None,
    }
}

/// Three-zone distance scan over the apparent-impedance series.
///
/// Zones are evaluated as an ordered if/else-if at each index — the scan
/// stops at the first index inside any reach, and only then does the zone
/// decide the delay: zone 1 trips instantaneously, zones 2 and 3 add their
/// fixed coordination delays. A delayed trip landing beyond the horizon is
/// reported with an empty trip index; downstream stages treat that as no
/// trip.
pub fn distance_decision(
    z_apparent: &[f64],
    reaches: (f64, f64, f64),
    sampling_hz: u32,
) -> TripDecision {
    let (zone1, zone2, zone3) = reaches;
    let samples = z_apparent.len();

    for (i, &z) in z_apparent.iter().enumerate() {
        if z < zone1 {
            return TripDecision {
                classification: Classification::Zone1,
                trip_idx: Some(i),
            };
        } else if z < zone2 {
            return delayed_trip(Classification::Zone2, i, ZONE2_DELAY, sampling_hz, samples);
        } else if z < zone3 {
            return delayed_trip(Classification::Zone3, i, ZONE3_DELAY, sampling_hz, samples);
        }
    }

    TripDecision {
        classification: Classification::NoTrip,
        trip_idx: None,
    }
}

fn delayed_trip(
    classification: Classification,
    detect_idx: usize,
    delay: std::time::Duration,
    sampling_hz: u32,
    samples: usize,
) -> TripDecision {
    let trip_idx = detect_idx + samples_in(delay, sampling_hz);
    TripDecision {
        classification,
        trip_idx: (trip_idx < samples).then_some(trip_idx),
    }
}
