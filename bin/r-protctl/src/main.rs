//! ---
//! prot_section: "05-operator-interfaces"
//! prot_subsection: "binary"
//! prot_type: "source"
//! prot_scope: "code"
//! prot_description: "Study CLI for operators running R-PROT scenarios."
//! prot_version: "v0.1.0"
//! prot_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use r_prot_common::config::{LoadedScenarioConfig, ScenarioConfig};
use r_prot_common::logging::init_tracing;
use r_prot_engine::run_study;
use tracing::info;

const SCENARIO_CANDIDATES: [&str; 2] = ["configs/scenario.toml", "scenario.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    disable_version_flag = true,
    about = "R-PROT protection study utility",
    long_about = None
)]
struct Cli {
    #[arg(
        short = 'V',
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit"
    )]
    version: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Run a protection study from a scenario file")]
    Run(RunCommand),
    #[command(about = "Validate a scenario file without running it")]
    Validate(ValidateCommand),
}

#[derive(Debug, Args, Default)]
struct RunCommand {
    /// Path to the scenario file; defaults to the usual candidates or the
    /// R_PROT_CONFIG override.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,

    /// Export study artifacts (JSON reports, event/current CSVs) here.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateCommand {
    /// Path to the scenario file; defaults to the usual candidates or the
    /// R_PROT_CONFIG override.
    #[arg(long, value_name = "FILE")]
    scenario: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.version {
        println!("R-PROT {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    match cli.command.unwrap_or_default() {
        Commands::Run(cmd) => cmd.execute(),
        Commands::Validate(cmd) => cmd.execute(),
    }
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run(RunCommand::default())
    }
}

impl RunCommand {
    fn execute(self) -> Result<()> {
        let loaded = load_scenario(self.scenario.as_deref())?;
        init_tracing("r-protctl", &loaded.config.logging)?;
        info!(scenario = %loaded.source.display(), "starting protection study");

        let summary = run_study(&loaded.config).context("study execution failed")?;

        println!("Fault: {}", summary.trip.classification);
        match summary.trip.trip_idx {
            Some(idx) => println!("Trip signal issued at t = {:.4} s", summary.time_s[idx]),
            None => println!("No trip signal issued"),
        }

        if let Some(open_idx) = summary.breaker.open_idx {
            match summary.time_s.get(open_idx) {
                Some(t) => println!("Breaker opened at t = {:.4} s", t),
                None => println!("Breaker opening fell beyond the study horizon"),
            }
        }

        if let Some(reclose) = &summary.reclose {
            if let Some(idx) = reclose.reclose_idx {
                println!("Reclose attempted at t = {:.4} s", summary.time_s[idx]);
            }
            println!("Auto-reclose status: {}", reclose.status);
        }

        if let Some(location) = &summary.location {
            println!(
                "Actual fault location:    {:>6.1} %  ({:.1} km)",
                location.actual_pct, location.actual_km
            );
            println!(
                "Estimated fault location: {:>6.1} %  ({:.1} km)",
                location.estimated_pct, location.estimated_km
            );
            println!("Estimation error:         {:>6.2} %", location.error_pct);
        }

        println!();
        println!("{:>10}  {}", "Time (s)", "Event");
        for event in summary.events.iter() {
            println!("{:>10.4}  {}", event.time_s, event.label);
        }

        if let Some(dir) = self.export {
            summary
                .exporter()
                .export_all(&dir)
                .context("failed to export study artifacts")?;
            println!();
            println!("Artifacts written to {}", dir.display());
        }

        Ok(())
    }
}

impl ValidateCommand {
    fn execute(self) -> Result<()> {
        let loaded = load_scenario(self.scenario.as_deref())?;
        println!(
            "Scenario {} is valid ({} samples at {} Hz)",
            loaded.source.display(),
            loaded.config.samples(),
            loaded.config.source.sampling_hz
        );
        Ok(())
    }
}

fn load_scenario(explicit: Option<&std::path::Path>) -> Result<LoadedScenarioConfig> {
    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    for candidate in SCENARIO_CANDIDATES {
        candidates.push(PathBuf::from(candidate));
    }
    ScenarioConfig::load_with_source(&candidates).context("unable to load scenario")
}
