//! Scenario replay binary for the `ChickenHunt` engine.
//!
//! Loads the game configuration and a scenario file, replays the scenario
//! against a fresh engine on a manual clock, and prints every emitted event
//! to stdout as one JSON object per line. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! chickenhunt-sim <scenario.yaml> [config.yaml]
//! ```
//!
//! Without a config argument, `chickenhunt-config.yaml` in the working
//! directory is used if present, otherwise the launch defaults.

mod error;
mod scenario;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use chickenhunt_core::GameConfig;
use chickenhunt_ledger::{SolvencyResult, verify_solvency};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::SimError;
use crate::scenario::{Replay, Scenario};

/// Default configuration file, relative to the working directory.
const CONFIG_FILE: &str = "chickenhunt-config.yaml";

fn main() -> Result<(), SimError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let mut args = std::env::args_os().skip(1);
    let scenario_path = args.next().map(PathBuf::from).ok_or(SimError::Usage)?;
    let config_path = args.next().map(PathBuf::from);

    info!("chickenhunt-sim starting");

    let config = load_config(config_path.as_deref())?;
    config.validate()?;
    info!(
        dividend_rate = config.distribution.dividend_rate,
        altar_cut = config.distribution.altar_cut,
        store_cut = config.distribution.store_cut,
        dev_cut = config.distribution.dev_cut,
        seed = config.arena.seed,
        "Configuration loaded"
    );

    let scenario = Scenario::from_file(&scenario_path)?;
    info!(
        path = %scenario_path.display(),
        steps = scenario.steps.len(),
        strict = scenario.strict,
        "Scenario file loaded"
    );

    let mut replay = Replay::new(&scenario, config)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let summary = replay.run(&scenario.steps, |record| {
        serde_json::to_writer(&mut out, record)?;
        writeln!(out)?;
        Ok(())
    })?;
    out.flush()?;

    let snapshot = replay.game().solvency_snapshot()?;
    let totals = serde_json::to_string(&snapshot)?;
    match verify_solvency(&snapshot) {
        SolvencyResult::Solvent { surplus } => info!(surplus, %totals, "Final state solvent"),
        SolvencyResult::Anomaly(anomaly) => warn!(%anomaly, %totals, "Final state insolvent"),
    }
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        events = summary.events,
        "chickenhunt-sim finished"
    );
    Ok(())
}

/// Load the game configuration.
///
/// An explicit path must exist. Otherwise [`CONFIG_FILE`] is read from the
/// working directory when present.
fn load_config(path: Option<&Path>) -> Result<GameConfig, SimError> {
    if let Some(path) = path {
        return Ok(GameConfig::from_file(path)?);
    }
    let default_path = Path::new(CONFIG_FILE);
    if default_path.exists() {
        Ok(GameConfig::from_file(default_path)?)
    } else {
        info!("Config file not found, using defaults");
        Ok(GameConfig::launch())
    }
}
