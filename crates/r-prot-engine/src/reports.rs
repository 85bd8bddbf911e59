//! ---
//! prot_section: "04-protection-studies"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Protection study pipeline and report routines."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use std::{fs, path::Path};

use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

use crate::errors::Result;
use crate::StudySummary;

/// Writes the study artifacts for downstream display/report layers.
#[derive(Debug)]
pub struct StudyExporter<'a> {
    summary: &'a StudySummary,
}

impl<'a> StudyExporter<'a> {
    pub fn new(summary: &'a StudySummary) -> Self {
        Self { summary }
    }

    pub fn export_all(&self, output_dir: &Path) -> Result<()> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        let timestamp = self.summary.timestamp.to_rfc3339();
        let run_id = self.summary.run_id.to_string();
        let label = self.summary.scenario_label.clone();
        let dt = self.summary.time_s.get(1).copied().unwrap_or(0.0);

        let trip = TripReport {
            classification: self.summary.trip.classification.to_string(),
            trip_idx: self.summary.trip.trip_idx,
            trip_time_s: self.summary.trip.trip_idx.map(|i| i as f64 * dt),
        };
        let trip_report =
            ReportEnvelope::new(&timestamp, &run_id, label.clone(), trip_schema(), &trip);
        write_json(output_dir.join("trip.json"), &trip_report)?;

        let reclose = RecloseReport {
            breaker_open_idx: self.summary.breaker.open_idx,
            breaker_open_time_s: self.summary.breaker.open_idx.map(|i| i as f64 * dt),
            reclose_idx: self.summary.reclose.and_then(|r| r.reclose_idx),
            reclose_time_s: self
                .summary
                .reclose
                .and_then(|r| r.reclose_idx)
                .map(|i| i as f64 * dt),
            status: self.summary.reclose.map(|r| r.status.to_string()),
        };
        let reclose_report = ReportEnvelope::new(
            &timestamp,
            &run_id,
            label.clone(),
            reclose_schema(),
            &reclose,
        );
        write_json(output_dir.join("reclose.json"), &reclose_report)?;

        match &self.summary.location {
            Some(location) => {
                let location_report = ReportEnvelope::new(
                    &timestamp,
                    &run_id,
                    label,
                    fault_location_schema(),
                    location,
                );
                write_json(output_dir.join("fault_location.json"), &location_report)?;
            }
            None => debug!("no fault-location estimate to export"),
        }

        self.write_events_csv(output_dir.join("events.csv"))?;
        self.write_currents_csv(output_dir.join("currents.csv"))?;

        info!("Study artifacts exported to {}", output_dir.display());
        Ok(())
    }

    fn write_events_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for event in self.summary.events.iter() {
            writer.serialize(event)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn write_currents_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        let currents = &self.summary.currents;
        for (i, &time_s) in self.summary.time_s.iter().enumerate() {
            writer.serialize(CurrentRow {
                index: i,
                time_s,
                ia: currents.a[i],
                ib: currents.b[i],
                ic: currents.c[i],
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct TripReport {
    classification: String,
    trip_idx: Option<usize>,
    trip_time_s: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RecloseReport {
    breaker_open_idx: Option<usize>,
    breaker_open_time_s: Option<f64>,
    reclose_idx: Option<usize>,
    reclose_time_s: Option<f64>,
    status: Option<String>,
}

#[derive(Debug, Serialize)]
struct CurrentRow {
    index: usize,
    time_s: f64,
    ia: f64,
    ib: f64,
    ic: f64,
}

#[derive(Debug, Serialize)]
struct ReportEnvelope<'a, T: Serialize> {
    timestamp: &'a str,
    run_id: &'a str,
    scenario_label: Option<String>,
    schema: serde_json::Value,
    data: &'a T,
}

impl<'a, T: Serialize> ReportEnvelope<'a, T> {
    fn new(
        timestamp: &'a str,
        run_id: &'a str,
        scenario_label: Option<String>,
        schema: serde_json::Value,
        data: &'a T,
    ) -> Self {
        Self {
            timestamp,
            run_id,
            scenario_label,
            schema,
            data,
        }
    }
}

fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)?;
    fs::write(path, serialized)?;
    Ok(())
}

fn trip_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "TripReport",
        "type": "object",
        "properties": {
            "classification": {"type": "string"},
            "trip_idx": {"type": ["integer", "null"]},
            "trip_time_s": {"type": ["number", "null"]}
        },
        "required": ["classification"],
    })
}

fn reclose_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "RecloseReport",
        "type": "object",
        "properties": {
            "breaker_open_idx": {"type": ["integer", "null"]},
            "breaker_open_time_s": {"type": ["number", "null"]},
            "reclose_idx": {"type": ["integer", "null"]},
            "reclose_time_s": {"type": ["number", "null"]},
            "status": {"type": ["string", "null"]}
        },
        "required": [],
    })
}

fn fault_location_schema() -> serde_json::Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "FaultLocationEstimate",
        "type": "object",
        "properties": {
            "estimated_pct": {"type": "number"},
            "estimated_km": {"type": "number"},
            "actual_pct": {"type": "number"},
            "actual_km": {"type": "number"},
            "error_pct": {"type": "number"}
        },
        "required": ["estimated_pct", "estimated_km", "actual_pct", "actual_km", "error_pct"],
    })
}
