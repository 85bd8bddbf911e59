//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
//! Time-domain protection study engine for the R-PROT workspace.
//!
//! A study is one deterministic batch run over a fixed horizon: an ideal
//! balanced source feeds a faulted R-L line, the relay classifies the
//! measurements and orders a trip, the breaker interrupts, and a
//! single-shot recloser attempts restoration. Every stage consumes the
//! full series produced by its predecessor; there is no shared mutable
//! state and independent studies can run side by side freely.

pub mod breaker;
pub mod errors;
pub mod events;
pub mod fault;
pub mod line;
pub mod location;
pub mod measurements;
pub mod recloser;
pub mod relay;
pub mod reports;
pub mod source;
pub mod waveform;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use r_prot_common::config::{RelayKind, ScenarioConfig};
use r_prot_common::time::sample_time;

use crate::breaker::{apply_breaker, BreakerOperation};
use crate::events::EventLog;
use crate::location::FaultLocationEstimate;
use crate::recloser::{RecloseOutcome, Recloser};
use crate::relay::TripDecision;
use crate::reports::StudyExporter;
use crate::waveform::ThreePhaseSeries;

pub use errors::{EngineError, Result};

/// Everything a display or report layer needs from one study run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StudySummary {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub scenario_label: Option<String>,
    pub trip: TripDecision,
    pub breaker: BreakerOperation,
    pub reclose: Option<RecloseOutcome>,
    pub location: Option<FaultLocationEstimate>,
    pub events: EventLog,
    pub time_s: Vec<f64>,
    pub currents: ThreePhaseSeries,
}

impl StudySummary {
    pub fn exporter(&self) -> StudyExporter<'_> {
        StudyExporter::new(self)
    }
}

/// Run the full protection pipeline over a validated scenario.
///
/// The scenario must have passed [`ScenarioConfig::validate`]; after that
/// point nothing here fails on configuration. A relay that never picks up,
/// or a breaker/reclose index past the horizon, resolves to sentinel
/// values and statuses rather than errors.
pub fn run_study(scenario: &ScenarioConfig) -> Result<StudySummary> {
    let sampling_hz = scenario.source.sampling_hz;
    let samples = scenario.samples();
    let window = scenario.rms_window();
    let onset_idx = scenario.fault_onset_idx();
    let mut events = EventLog::new();

    info!("Synthesising balanced three-phase source...");
    let (time_s, voltages) = source::balanced_three_phase(&scenario.source)?;

    info!(
        kind = ?scenario.fault.kind,
        nature = ?scenario.fault.nature,
        onset_idx,
        factor = scenario.fault.resistance_factor,
        "Applying fault to source waveforms..."
    );
    let voltages = fault::inject(
        voltages,
        scenario.fault.kind,
        onset_idx,
        scenario.fault.resistance_factor,
    );
    events.record(sample_time(onset_idx, sampling_hz), "Fault Applied");

    info!("Deriving line currents...");
    let currents = line::line_currents(&voltages, &scenario.line, sampling_hz);

    info!(window, "Extracting relay measurements...");
    let ia_rms = measurements::windowed_rms(&currents.a, window);
    let ib_rms = measurements::windowed_rms(&currents.b, window);
    let ic_rms = measurements::windowed_rms(&currents.c, window);

    let i0 = measurements::zero_sequence(&currents);
    let i0_rms = measurements::windowed_rms(&i0, window);
    let i2 = measurements::negative_sequence(&currents);
    let i2_rms = measurements::windowed_rms(&i2, window);
    let i2_peak = i2_rms.iter().cloned().fold(0.0, f64::max);
    debug!(
        i2_peak,
        pickup = scenario.relay.neg_seq_pickup_a,
        "negative-sequence channel observed"
    );

    let mut z_apparent = None;
    let trip = match scenario.relay.kind {
        RelayKind::Overcurrent => {
            info!("Running overcurrent relay scan...");
            let decision =
                relay::overcurrent_decision(&ia_rms, &ib_rms, &ic_rms, &i0_rms, &scenario.relay);
            if let Some(idx) = decision.trip_idx {
                events.record(sample_time(idx, sampling_hz), "Overcurrent Trip");
            }
            decision
        }
        RelayKind::Distance => {
            info!("Running distance relay scan...");
            let va_rms = measurements::windowed_rms(&voltages.a, window);
            let z = measurements::apparent_impedance(&va_rms, &ia_rms);
            let reaches = scenario.relay.zone_reaches(scenario.line.impedance_ohm);
            let decision = relay::distance_decision(&z, reaches, sampling_hz);
            if let Some(idx) = decision.trip_idx {
                events.record(
                    sample_time(idx, sampling_hz),
                    decision.classification.to_string(),
                );
            }
            z_apparent = Some(z);
            decision
        }
    };
    info!(classification = %trip.classification, trip_idx = ?trip.trip_idx, "Relay decision taken");

    info!("Operating breaker...");
    let (currents, breaker_op) =
        apply_breaker(currents, trip.trip_idx, scenario.breaker_delay_samples());
    if let Some(open_idx) = breaker_op.open_idx {
        events.record(sample_time(open_idx, sampling_hz), "Breaker Open");
    }

    info!("Evaluating auto-reclose sequence...");
    let mut recloser = Recloser::new(
        scenario.dead_time_samples(),
        scenario.recloser.persistence_threshold_a,
    );
    let (currents, reclose) = recloser.run(currents, breaker_op.open_idx);
    if let (Some(outcome), Some(open_idx)) = (&reclose, breaker_op.open_idx) {
        let attempt_idx = open_idx + scenario.dead_time_samples();
        if outcome.reclose_idx.is_some() {
            events.record(sample_time(attempt_idx, sampling_hz), "Reclose Attempt");
        }
        events.record(
            sample_time(attempt_idx, sampling_hz),
            outcome.status.to_string(),
        );
    }

    let location = match (&z_apparent, trip.trip_idx) {
        (Some(z), Some(trip_idx)) => {
            info!("Estimating fault location...");
            Some(location::locate_fault(
                z[trip_idx],
                &scenario.line,
                scenario.fault.location_pct,
            ))
        }
        _ => None,
    };

    let summary = StudySummary {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now(),
        scenario_label: scenario.label.clone(),
        trip,
        breaker: breaker_op,
        reclose,
        location,
        events,
        time_s,
        currents,
    };
    info!(run_id = %summary.run_id, samples, "Study complete");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recloser::RecloseStatus;
    use crate::relay::Classification;
    use r_prot_common::config::RelayKind;

    fn labels(summary: &StudySummary) -> Vec<String> {
        summary
            .events
            .iter()
            .map(|e| e.label.clone())
            .collect::<Vec<_>>()
    }

    #[test]
    fn overcurrent_pipeline_runs_end_to_end() {
        let scenario = ScenarioConfig::default();
        let summary = run_study(&scenario).unwrap();

        assert_eq!(summary.currents.len(), 5000);
        assert_eq!(summary.time_s.len(), 5000);

        // Load current already sits above the 20 A pickup, so the relay
        // picks up at the first index with a full measurement window.
        assert_eq!(summary.trip.classification, Classification::ThreePhase);
        assert_eq!(summary.trip.trip_idx, Some(100));
        assert_eq!(summary.breaker.open_idx, Some(300));

        let reclose = summary.reclose.expect("breaker operated");
        assert_eq!(reclose.reclose_idx, Some(2800));
        assert_eq!(reclose.status, RecloseStatus::RecloseSuccess);

        // Interrupted span is dead; the restored span replays the head.
        assert!(summary.currents.a[300..2800].iter().all(|&s| s == 0.0));
        assert_eq!(summary.currents.a[2800], 0.0);

        assert!(summary.location.is_none());
        assert_eq!(
            labels(&summary),
            [
                "Fault Applied",
                "Overcurrent Trip",
                "Breaker Open",
                "Reclose Attempt",
                "RECLOSE SUCCESS"
            ]
        );
    }

    #[test]
    fn distance_pipeline_estimates_location() {
        let mut scenario = ScenarioConfig::default();
        scenario.relay.kind = RelayKind::Distance;
        let summary = run_study(&scenario).unwrap();

        // The warm-up zeros of the RMS estimators read as zero impedance,
        // so the zone-1 element is inside reach at the very first sample.
        assert_eq!(summary.trip.classification, Classification::Zone1);
        assert_eq!(summary.trip.trip_idx, Some(0));
        assert_eq!(summary.breaker.open_idx, Some(200));

        let location = summary.location.as_ref().expect("distance trip locates");
        assert_eq!(location.estimated_pct, 0.0);
        assert_eq!(location.actual_pct, 40.0);
        assert!((location.error_pct - 40.0).abs() < 1e-9);
        assert!((location.actual_km - 40.0).abs() < 1e-9);

        assert_eq!(
            labels(&summary),
            [
                "Fault Applied",
                "Zone-1 Distance Trip",
                "Breaker Open",
                "Reclose Attempt",
                "RECLOSE SUCCESS"
            ]
        );
    }

    #[test]
    fn no_trip_terminates_the_sequence() {
        let mut scenario = ScenarioConfig::default();
        scenario.relay.pickup_a = 10_000.0;
        let summary = run_study(&scenario).unwrap();

        assert_eq!(summary.trip.classification, Classification::NoFault);
        assert_eq!(summary.trip.trip_idx, None);
        assert_eq!(summary.breaker.open_idx, None);
        assert!(summary.reclose.is_none());
        assert!(summary.location.is_none());
        assert_eq!(labels(&summary), ["Fault Applied"]);
        // Currents pass through the idle breaker untouched.
        assert!(summary.currents.a[4999] != 0.0);
    }

    #[test]
    fn dead_time_past_horizon_locks_out() {
        let mut scenario = ScenarioConfig::default();
        scenario.source.duration_s = 0.5;
        let summary = run_study(&scenario).unwrap();

        // trip at 100, open at 300, attempt at 2800 ≥ 2500 samples.
        assert_eq!(summary.breaker.open_idx, Some(300));
        let reclose = summary.reclose.expect("breaker operated");
        assert_eq!(reclose.reclose_idx, None);
        assert_eq!(reclose.status, RecloseStatus::Lockout);
        assert_eq!(
            labels(&summary),
            ["Fault Applied", "Overcurrent Trip", "Breaker Open", "LOCKOUT"]
        );
    }
}
