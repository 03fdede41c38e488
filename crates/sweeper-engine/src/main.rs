//! Headless driver for the Sweeper core.
//!
//! Loads a scene from configuration, replays its scripted contacts, and
//! runs the paced tick loop until a bound is hit or Ctrl-C is pressed.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `sweeper-config.yaml` (or `SWEEPER_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Assemble the event fan-out
//! 4. Create run controls and install the Ctrl-C handler
//! 5. Run the scene loop
//! 6. Log the result

mod error;
mod log_callback;
mod script;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sweeper_core::config::{LogFormat, LoggingConfig, SceneConfig};
use sweeper_core::operator::RunControls;
use sweeper_core::runner;
use sweeper_events::{Fanout, JsonLinesSink, TracingSink};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::log_callback::LoggingCallback;
use crate::script::ScriptedContacts;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "sweeper-config.yaml";

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SWEEPER_CONFIG";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if the configuration cannot be read or the scene
/// cannot be built.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration before logging so the subscriber can honor it.
    let config_path = config_path();
    let loaded = load_config(&config_path)?;
    let found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("sweeper-engine starting");
    if found {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    let pacer = config.driver.pacer();
    info!(
        fps = pacer.fps(),
        sweepers = config.sweepers.len(),
        goals = config.goals.len(),
        plates = config.plates.len(),
        doors = config.doors.len(),
        scripted_contacts = config.script.len(),
        "Scene configuration"
    );

    // 3. Event fan-out.
    let mut sink = Fanout::new().with(TracingSink);
    if config.logging.events_json {
        sink.subscribe(JsonLinesSink::new(std::io::stdout()));
    }

    // 4. Run controls and Ctrl-C.
    let controls = Arc::new(RunControls::from_config(&config.driver));
    info!(
        max_ticks = controls.max_ticks(),
        max_real_time_seconds = controls.max_real_time_seconds(),
        started_at = %controls.started_at(),
        "Run controls initialized"
    );
    spawn_stop_on_ctrl_c(Arc::clone(&controls));

    // 5. Run.
    let mut contacts = ScriptedContacts::new(std::mem::take(&mut config.script));
    let mut callback = LoggingCallback::new(u64::from(pacer.fps()));
    let result = runner::run_scene(
        pacer,
        &controls,
        &mut config,
        &mut contacts,
        &mut sink,
        &mut callback,
    )
    .await
    .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_run_end(&result);
    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        kills = callback.kills(),
        goals_reached = callback.goals_reached(),
        "sweeper-engine shutdown complete"
    );

    Ok(())
}

/// Resolve the configuration path from the environment.
fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Load the scene configuration, or `None` if the file does not exist.
fn load_config(path: &Path) -> Result<Option<SceneConfig>, EngineError> {
    if path.exists() {
        Ok(Some(SceneConfig::from_file(path)?))
    } else {
        Ok(None)
    }
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over the
/// configured level.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match logging.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
        LogFormat::Human => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init(),
    }
}

/// Request a clean stop when Ctrl-C is received.
fn spawn_stop_on_ctrl_c(controls: Arc<RunControls>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received, stopping");
                controls.request_stop();
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for Ctrl-C");
            }
        }
    });
}
