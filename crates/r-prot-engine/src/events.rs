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
use tracing::debug;

/// One entry of the study audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Simulation timestamp, seconds from the start of the horizon.
    pub time_s: f64,
    pub label: String,
}

/// Append-only audit log of a study run.
///
/// Entries stay in append order; stages may legitimately record an event
/// whose timestamp precedes an earlier entry (a relay picking up on load
/// current before the fault manifests, for instance), and the log keeps
/// that narrative order rather than re-sorting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, time_s: f64, label: impl Into<String>) {
        let label = label.into();
        debug!(time_s, %label, "study event");
        self.events.push(Event { time_s, label });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_append_order() {
        let mut log = EventLog::new();
        log.record(0.4, "Fault Applied");
        log.record(0.02, "Overcurrent Trip");
        log.record(0.06, "Breaker Open");
        let labels: Vec<_> = log.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Fault Applied", "Overcurrent Trip", "Breaker Open"]);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn starts_empty() {
        assert!(EventLog::new().is_empty());
    }
}
