//! ---
//! prot_section: "01-core-functionality"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Shared primitives and utilities for the study runtime."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSecondsWithFrac};
use tracing::debug;

use crate::logging::LogFormat;
use crate::time::{cycle_window, sample_count, samples_in};

/// Sampling rates offered by the study front-ends.
pub const SUPPORTED_SAMPLING_HZ: [u32; 3] = [2000, 5000, 10000];

/// Study horizons offered by the study front-ends.
pub const SUPPORTED_DURATIONS_S: [f64; 3] = [0.5, 1.0, 1.5];

fn default_voltage_rms() -> f64 {
    230.0
}

fn default_frequency() -> f64 {
    50.0
}

fn default_duration_s() -> f64 {
    1.0
}

fn default_sampling_hz() -> u32 {
    5000
}

fn default_resistance_factor() -> f64 {
    0.01
}

fn default_location_pct() -> f64 {
    40.0
}

fn default_line_resistance() -> f64 {
    1.0
}

fn default_line_inductance() -> f64 {
    0.01
}

fn default_line_length_km() -> f64 {
    100.0
}

fn default_line_impedance() -> f64 {
    20.0
}

fn default_pickup() -> f64 {
    20.0
}

fn default_sequence_pickup() -> f64 {
    5.0
}

fn default_zone1_factor() -> f64 {
    0.8
}

fn default_zone2_factor() -> f64 {
    1.2
}

fn default_zone3_factor() -> f64 {
    2.0
}

fn default_open_delay() -> Duration {
    Duration::from_millis(40)
}

fn default_dead_time() -> Duration {
    Duration::from_millis(500)
}

fn default_persistence_threshold() -> f64 {
    5.0
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

/// Primary configuration object for a protection study.
///
/// Every parameter is validated up front; a study run never fails on
/// configuration mid-pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub fault: FaultConfig,
    #[serde(default)]
    pub line: LineConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub recloser: RecloserConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where a [`ScenarioConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedScenarioConfig {
    pub config: ScenarioConfig,
    pub source: PathBuf,
}

impl ScenarioConfig {
    pub const ENV_CONFIG_PATH: &str = "R_PROT_CONFIG";

    /// Load a scenario from disk, respecting the `R_PROT_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load a scenario from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedScenarioConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedScenarioConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(path.clone())?;
                return Ok(LoadedScenarioConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no scenario files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    fn from_path(path: PathBuf) -> Result<Self> {
        debug!(scenario_path = %path.display(), "loading scenario");
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("unable to read scenario file {}", path.display()))?;
        let config = toml::from_str::<ScenarioConfig>(&contents)
            .with_context(|| format!("failed to parse scenario file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Number of samples in the study horizon.
    pub fn samples(&self) -> usize {
        sample_count(self.source.sampling_hz, self.source.duration_s)
    }

    /// One-cycle RMS window at the configured rate.
    pub fn rms_window(&self) -> usize {
        cycle_window(self.source.sampling_hz, self.source.frequency_hz)
    }

    /// Sample index at which the fault manifests.
    pub fn fault_onset_idx(&self) -> usize {
        self.fault
            .onset_idx(self.source.sampling_hz, self.samples())
    }

    /// Breaker trip-to-open delay in whole samples.
    pub fn breaker_delay_samples(&self) -> usize {
        samples_in(self.breaker.open_delay, self.source.sampling_hz)
    }

    /// Auto-reclose dead time in whole samples.
    pub fn dead_time_samples(&self) -> usize {
        samples_in(self.recloser.dead_time, self.source.sampling_hz)
    }

    /// Validate structural invariants before a study starts.
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.fault
            .validate(self.source.sampling_hz, self.samples())?;
        self.line.validate()?;
        self.relay.validate()?;
        if self.breaker.open_delay.is_zero() {
            return Err(anyhow!("breaker open delay must be positive"));
        }
        if self.recloser.dead_time.is_zero() {
            return Err(anyhow!("auto-reclose dead time must be positive"));
        }
        if self.recloser.persistence_threshold_a <= 0.0 {
            return Err(anyhow!("reclose persistence threshold must be positive"));
        }
        Ok(())
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            label: None,
            source: SourceConfig::default(),
            fault: FaultConfig::default(),
            line: LineConfig::default(),
            relay: RelayConfig::default(),
            breaker: BreakerConfig::default(),
            recloser: RecloserConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for ScenarioConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: ScenarioConfig =
            toml::from_str(content).with_context(|| "failed to parse scenario")?;
        config.validate()?;
        Ok(config)
    }
}

/// Ideal balanced source feeding the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_voltage_rms")]
    pub voltage_rms_v: f64,
    #[serde(default = "default_frequency")]
    pub frequency_hz: f64,
    #[serde(default = "default_duration_s")]
    pub duration_s: f64,
    #[serde(default = "default_sampling_hz")]
    pub sampling_hz: u32,
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.voltage_rms_v <= 0.0 {
            return Err(anyhow!("source RMS voltage must be positive"));
        }
        if self.frequency_hz <= 0.0 {
            return Err(anyhow!("source frequency must be positive"));
        }
        if !SUPPORTED_SAMPLING_HZ.contains(&self.sampling_hz) {
            return Err(anyhow!(
                "sampling rate {} Hz unsupported (expected one of {:?})",
                self.sampling_hz,
                SUPPORTED_SAMPLING_HZ
            ));
        }
        if !SUPPORTED_DURATIONS_S.contains(&self.duration_s) {
            return Err(anyhow!(
                "study duration {} s unsupported (expected one of {:?})",
                self.duration_s,
                SUPPORTED_DURATIONS_S
            ));
        }
        Ok(())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            voltage_rms_v: default_voltage_rms(),
            frequency_hz: default_frequency(),
            duration_s: default_duration_s(),
            sampling_hz: default_sampling_hz(),
        }
    }
}

/// Fault pattern applied to the source waveforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaultConfig {
    #[serde(default)]
    pub kind: FaultKind,
    #[serde(default)]
    pub nature: FaultNature,
    /// Voltage-divider attenuation in (0, 1]; 1 leaves the waveform intact,
    /// smaller values model a more severe fault.
    #[serde(default = "default_resistance_factor")]
    pub resistance_factor: f64,
    /// Location of the fault along the line, percent of total length.
    #[serde(default = "default_location_pct")]
    pub location_pct: f64,
    /// Explicit fault inception time. When unset, the onset index is derived
    /// from the location percentage over the study horizon.
    #[serde(default)]
    pub onset_time_s: Option<f64>,
}

impl FaultConfig {
    /// Sample index at which the fault manifests.
    pub fn onset_idx(&self, sampling_hz: u32, samples: usize) -> usize {
        match self.onset_time_s {
            Some(t) => (t * f64::from(sampling_hz)) as usize,
            None => ((self.location_pct / 100.0) * samples as f64) as usize,
        }
    }

    pub fn validate(&self, sampling_hz: u32, samples: usize) -> Result<()> {
        if self.resistance_factor <= 0.0 || self.resistance_factor > 1.0 {
            return Err(anyhow!(
                "fault resistance factor {} out of range (0, 1]",
                self.resistance_factor
            ));
        }
        if !(0.0..=100.0).contains(&self.location_pct) {
            return Err(anyhow!(
                "fault location {}% out of range [0, 100]",
                self.location_pct
            ));
        }
        if let Some(t) = self.onset_time_s {
            if t < 0.0 {
                return Err(anyhow!("fault onset time must not be negative"));
            }
        }
        let onset = self.onset_idx(sampling_hz, samples);
        if onset >= samples {
            return Err(anyhow!(
                "fault onset index {} falls beyond the study horizon of {} samples",
                onset,
                samples
            ));
        }
        Ok(())
    }
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            kind: FaultKind::default(),
            nature: FaultNature::default(),
            resistance_factor: default_resistance_factor(),
            location_pct: default_location_pct(),
            onset_time_s: None,
        }
    }
}

/// Which phases participate in the fault.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FaultKind {
    /// Single line-to-ground fault on phase A.
    #[serde(rename = "LG")]
    LineToGround,
    /// Line-to-line fault between phases A and B.
    #[serde(rename = "LL")]
    LineToLine,
    /// Symmetric three-phase fault.
    #[serde(rename = "LLL")]
    #[default]
    ThreePhase,
}

/// Whether the fault clears on its own once the line is de-energized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FaultNature {
    #[default]
    Temporary,
    Permanent,
}

/// Series R-L parameters and protection ratings of the studied line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineConfig {
    pub resistance_ohm: f64,
    pub inductance_h: f64,
    pub length_km: f64,
    /// Total positive-sequence impedance used by the distance element and the
    /// fault locator.
    pub impedance_ohm: f64,
}

impl LineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.resistance_ohm <= 0.0 {
            return Err(anyhow!("line resistance must be positive"));
        }
        if self.inductance_h <= 0.0 {
            return Err(anyhow!("line inductance must be positive"));
        }
        if self.length_km <= 0.0 {
            return Err(anyhow!("line length must be positive"));
        }
        if self.impedance_ohm <= 0.0 {
            return Err(anyhow!("line impedance must be positive"));
        }
        Ok(())
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            resistance_ohm: default_line_resistance(),
            inductance_h: default_line_inductance(),
            length_km: default_line_length_km(),
            impedance_ohm: default_line_impedance(),
        }
    }
}

/// Protection scheme selection and settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub kind: RelayKind,
    /// Phase overcurrent pickup.
    #[serde(default = "default_pickup")]
    pub pickup_a: f64,
    /// Zero-sequence pickup discriminating ground faults.
    #[serde(default = "default_sequence_pickup")]
    pub zero_seq_pickup_a: f64,
    /// Negative-sequence pickup, recorded alongside the other measurements.
    #[serde(default = "default_sequence_pickup")]
    pub neg_seq_pickup_a: f64,
    #[serde(default = "default_zone1_factor")]
    pub zone1_reach_factor: f64,
    #[serde(default = "default_zone2_factor")]
    pub zone2_reach_factor: f64,
    #[serde(default = "default_zone3_factor")]
    pub zone3_reach_factor: f64,
}

impl RelayConfig {
    /// Nested reach impedances derived from the protected line impedance.
    pub fn zone_reaches(&self, line_impedance_ohm: f64) -> (f64, f64, f64) {
        (
            self.zone1_reach_factor * line_impedance_ohm,
            self.zone2_reach_factor * line_impedance_ohm,
            self.zone3_reach_factor * line_impedance_ohm,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.pickup_a <= 0.0 || self.zero_seq_pickup_a <= 0.0 || self.neg_seq_pickup_a <= 0.0 {
            return Err(anyhow!("relay pickups must be positive"));
        }
        if self.zone1_reach_factor <= 0.0 {
            return Err(anyhow!("zone-1 reach factor must be positive"));
        }
        if self.zone1_reach_factor >= self.zone2_reach_factor
            || self.zone2_reach_factor >= self.zone3_reach_factor
        {
            return Err(anyhow!(
                "zone reach factors must be strictly increasing (got {}, {}, {})",
                self.zone1_reach_factor,
                self.zone2_reach_factor,
                self.zone3_reach_factor
            ));
        }
        Ok(())
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            kind: RelayKind::default(),
            pickup_a: default_pickup(),
            zero_seq_pickup_a: default_sequence_pickup(),
            neg_seq_pickup_a: default_sequence_pickup(),
            zone1_reach_factor: default_zone1_factor(),
            zone2_reach_factor: default_zone2_factor(),
            zone3_reach_factor: default_zone3_factor(),
        }
    }
}

/// Selected protection scheme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RelayKind {
    #[default]
    Overcurrent,
    Distance,
}

/// Breaker mechanism timing.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakerConfig {
    /// Delay between the trip order and the poles actually parting.
    #[serde(default = "default_open_delay")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub open_delay: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            open_delay: default_open_delay(),
        }
    }
}

/// Single-shot auto-reclose settings.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecloserConfig {
    /// De-energized interval observed before the reclose attempt.
    #[serde(default = "default_dead_time")]
    #[serde_as(as = "DurationSecondsWithFrac<f64>")]
    pub dead_time: Duration,
    /// Current magnitude above which the fault is judged still present at
    /// the reclose instant.
    #[serde(default = "default_persistence_threshold")]
    pub persistence_threshold_a: f64,
}

impl Default for RecloserConfig {
    fn default() -> Self {
        Self {
            dead_time: default_dead_time(),
            persistence_threshold_a: default_persistence_threshold(),
        }
    }
}

/// Logging sink configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_scenario_validates() {
        let config = ScenarioConfig::default();
        config.validate().unwrap();
        assert_eq!(config.samples(), 5000);
        assert_eq!(config.rms_window(), 100);
        assert_eq!(config.fault_onset_idx(), 2000);
        assert_eq!(config.breaker_delay_samples(), 200);
        assert_eq!(config.dead_time_samples(), 2500);
    }

    #[test]
    fn parses_minimal_toml() {
        let config: ScenarioConfig = r#"
            label = "lg-study"

            [fault]
            kind = "LG"
            nature = "permanent"
            resistance_factor = 0.05

            [relay]
            kind = "distance"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.label.as_deref(), Some("lg-study"));
        assert_eq!(config.fault.kind, FaultKind::LineToGround);
        assert_eq!(config.fault.nature, FaultNature::Permanent);
        assert_eq!(config.relay.kind, RelayKind::Distance);
        assert_eq!(config.source.sampling_hz, 5000);
    }

    #[test]
    fn explicit_onset_time_overrides_location() {
        let config: ScenarioConfig = r#"
            [fault]
            onset_time_s = 0.02
        "#
        .parse()
        .unwrap();
        assert_eq!(config.fault_onset_idx(), 100);
    }

    #[test]
    fn rejects_out_of_range_parameters() {
        for toml in [
            "[fault]\nresistance_factor = 0.0",
            "[fault]\nresistance_factor = 1.5",
            "[fault]\nlocation_pct = 120.0",
            "[fault]\nonset_time_s = 2.0",
            "[source]\nsampling_hz = 4000",
            "[source]\nduration_s = 2.0",
            "[source]\nvoltage_rms_v = -1.0",
            "[line]\nimpedance_ohm = 0.0",
            "[line]\nlength_km = -5.0",
            "[relay]\nzone1_reach_factor = 1.5",
            "[breaker]\nopen_delay = 0.0",
            "[recloser]\ndead_time = 0.0",
        ] {
            let parsed = toml.parse::<ScenarioConfig>();
            assert!(parsed.is_err(), "expected rejection for: {toml}");
        }
    }

    #[test]
    fn zone_reaches_scale_line_impedance() {
        let relay = RelayConfig::default();
        let (z1, z2, z3) = relay.zone_reaches(20.0);
        assert!((z1 - 16.0).abs() < 1e-9);
        assert!((z2 - 24.0).abs() < 1e-9);
        assert!((z3 - 40.0).abs() < 1e-9);
    }

    #[test]
    fn loads_from_candidate_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "label = \"from-disk\"").unwrap();
        let loaded = ScenarioConfig::load_with_source(&[file.path()]).unwrap();
        assert_eq!(loaded.config.label.as_deref(), Some("from-disk"));
        assert_eq!(loaded.source, file.path());
    }
}
