//! ---
//! prot_section: "01-core-functionality"
//! prot_subsection: "module"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Shared primitives and utilities for the study runtime."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
//! Core shared primitives for the R-PROT study workspace.
//! This crate exposes scenario configuration loading, logging bootstrap,
//! and sample-domain time utilities consumed across the workspace.

pub mod config;
pub mod logging;
pub mod time;

pub use config::{
    BreakerConfig, FaultConfig, FaultKind, FaultNature, LineConfig, LoggingConfig, RecloserConfig,
    RelayConfig, RelayKind, ScenarioConfig, SourceConfig,
};
pub use logging::{init_tracing, LogFormat};
pub use time::{cycle_window, sample_count, sample_time, samples_in};
