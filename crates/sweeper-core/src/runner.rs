//! Scene loop runner with run controls.
//!
//! This module provides [`run_scene`], the top-level async function that
//! drives the tick loop with support for:
//!
//! - **Fixed pacing**: one tick of `1 / fps` seconds per frame interval
//! - **Bounded runs**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume**: controllers can halt and continue the loop
//! - **Reloads**: when a reload fires the scene is rebuilt and re-activated
//! - **Clean stop**: a stop request ends the loop before the next tick
//!
//! The runner wraps the single-tick [`run_tick`] function and adds the
//! control plane around it.
//!
//! [`run_tick`]: crate::tick::run_tick

use std::sync::Arc;

use sweeper_events::EventSink;
use sweeper_types::ReloadReason;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::SceneConfig;
use crate::operator::{RunControls, RunEndReason};
use crate::pacing::FramePacer;
use crate::reload::ResetHandler;
use crate::tick::{self, SceneError, SceneState, TargetedContact, TickSummary};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The scene could not be (re)built.
    #[error("scene error: {source}")]
    Scene {
        /// The underlying scene error.
        #[from]
        source: SceneError,
    },
}

/// Result of a run.
#[derive(Debug)]
pub struct RunResult {
    /// The reason the run ended.
    pub end_reason: RunEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed across all reloads.
    pub total_ticks: u64,
    /// Number of scene reloads performed.
    pub reloads: u64,
}

/// Builds a fresh scene, initially and after every reload.
pub trait SceneFactory: Send {
    /// Assemble a new, inactive scene.
    fn build(&mut self) -> Result<SceneState, SceneError>;
}

impl SceneFactory for SceneConfig {
    fn build(&mut self) -> Result<SceneState, SceneError> {
        SceneState::from_config(self)
    }
}

/// Supplies the contacts observed during each tick.
pub trait ContactSource: Send {
    /// Contacts due up to `scene_time` seconds after the scene loaded.
    fn poll(&mut self, scene_time: f64) -> Vec<TargetedContact>;

    /// Start over after the scene was rebuilt.
    fn rewind(&mut self);
}

/// A contact source that never reports anything.
#[derive(Debug, Default)]
pub struct NoContacts;

impl ContactSource for NoContacts {
    fn poll(&mut self, _scene_time: f64) -> Vec<TargetedContact> {
        Vec::new()
    }

    fn rewind(&mut self) {}
}

/// Callback invoked after each tick completes.
pub trait TickCallback: Send {
    /// Called after a tick completes.
    fn on_tick(&mut self, summary: &TickSummary, state: &SceneState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SceneState) {}
}

/// Remembers the reload requested during a tick.
#[derive(Debug, Default)]
struct PendingReload {
    reason: Option<ReloadReason>,
}

impl ResetHandler for PendingReload {
    fn reset(&mut self, reason: ReloadReason) {
        self.reason = Some(reason);
    }
}

fn load_scene(
    factory: &mut dyn SceneFactory,
    sink: &mut dyn EventSink,
) -> Result<SceneState, RunnerError> {
    let mut scene = factory.build()?;
    scene.activate(sink);
    Ok(scene)
}

/// Run the scene loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if the scene cannot be built or rebuilt.
pub async fn run_scene(
    pacer: FramePacer,
    controls: &Arc<RunControls>,
    factory: &mut dyn SceneFactory,
    contacts: &mut dyn ContactSource,
    sink: &mut (dyn EventSink + Send),
    callback: &mut dyn TickCallback,
) -> Result<RunResult, RunnerError> {
    let mut scene = load_scene(factory, sink)?;
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut reloads: u64 = 0;
    let dt = pacer.frame_delta();

    let mut interval = tokio::time::interval(pacer.frame_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        fps = pacer.fps(),
        max_ticks = controls.max_ticks(),
        max_real_time_seconds = controls.max_real_time_seconds(),
        "Run starting"
    );

    let end_reason = loop {
        // --- Check pause ---
        if controls.is_paused() {
            info!("Run paused, waiting for resume...");
            controls.wait_if_paused().await;
            info!("Run resumed");
        }

        // --- Check stop request (before tick) ---
        if controls.is_stop_requested() {
            info!("Stop requested");
            break RunEndReason::StopRequested;
        }

        // --- Check time limit (before tick) ---
        if controls.time_limit_reached() {
            info!(
                max_seconds = controls.max_real_time_seconds(),
                elapsed = controls.elapsed_seconds(),
                "Real-time limit reached"
            );
            break RunEndReason::MaxRealTimeReached;
        }

        interval.tick().await;

        // --- Execute tick ---
        let due = contacts.poll(scene.time() + dt);
        let mut pending = PendingReload::default();
        let summary = tick::run_tick(&mut scene, dt, &due, sink, &mut pending);
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, &scene);

        // --- Reload ---
        if let Some(reason) = pending.reason {
            reloads = reloads.saturating_add(1);
            info!(?reason, reloads, "Rebuilding scene");
            scene = load_scene(factory, sink)?;
            contacts.rewind();
        }

        // --- Check tick limit (after tick) ---
        let limit_reached = controls.tick_limit_reached(total_ticks);
        last_summary = Some(summary);
        if limit_reached {
            info!(total_ticks, max_ticks = controls.max_ticks(), "Tick limit reached");
            break RunEndReason::MaxTicksReached;
        }
    };

    Ok(RunResult {
        end_reason,
        final_summary: last_summary,
        total_ticks,
        reloads,
    })
}

/// Log the end of a run.
pub fn log_run_end(result: &RunResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        reloads = result.reloads,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        final_time = result.final_summary.as_ref().map(|s| s.time),
        "Run ended"
    );

    if result.final_summary.is_none() {
        warn!("Run ended with no ticks executed");
    }
}
