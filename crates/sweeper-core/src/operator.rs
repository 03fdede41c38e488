//! Run control state shared between the tick loop and its controllers.
//!
//! The tick loop reads these flags on every iteration; a signal handler or
//! any other task may pause, resume, or stop the run. All mutable fields are
//! atomics so the hot path never takes a lock.
//!
//! Pause and resume are hooks for embedding hosts (a debugger overlay, an
//! editor, a test harness). The bundled engine binary only requests a stop,
//! on Ctrl-C.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::config::DriverConfig;

/// Reason why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// A stop was requested.
    StopRequested,
}

/// Shared run control state.
#[derive(Debug)]
pub struct RunControls {
    paused: AtomicBool,
    resume_notify: Notify,
    stop_requested: AtomicBool,
    stop_notify: Notify,
    started_at: DateTime<Utc>,
    max_ticks: u64,
    max_real_time_seconds: u64,
}

impl RunControls {
    /// Create run controls with explicit bounds (0 = unlimited).
    pub fn new(max_ticks: u64, max_real_time_seconds: u64) -> Self {
        Self {
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            started_at: Utc::now(),
            max_ticks,
            max_real_time_seconds,
        }
    }

    /// Create run controls from the driver configuration.
    pub fn from_config(driver: &DriverConfig) -> Self {
        Self::new(driver.max_ticks, driver.max_real_time_seconds)
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the run is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the run. The tick loop sleeps until resumed or stopped.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the run and wake the tick loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the run is no longer paused or a stop was requested.
    pub async fn wait_if_paused(&self) {
        while self.is_paused() && !self.is_stop_requested() {
            tokio::select! {
                () = self.resume_notify.notified() => {}
                () = self.stop_notify.notified() => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Returns `true` if `max_ticks > 0` and `ticks >= max_ticks`.
    pub const fn tick_limit_reached(&self, ticks: u64) -> bool {
        self.max_ticks > 0 && ticks >= self.max_ticks
    }

    /// Returns `true` if `max_real_time_seconds > 0` and that many seconds
    /// have passed since the run started.
    pub fn time_limit_reached(&self) -> bool {
        self.max_real_time_seconds > 0 && self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since the run started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max ticks.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn initial_state_is_running() {
        let controls = RunControls::new(0, 0);
        assert!(!controls.is_paused());
        assert!(!controls.is_stop_requested());
    }

    #[test]
    fn pause_and_resume() {
        let controls = RunControls::new(0, 0);
        controls.pause();
        assert!(controls.is_paused());
        controls.resume();
        assert!(!controls.is_paused());
    }

    #[test]
    fn zero_limits_mean_unlimited() {
        let controls = RunControls::new(0, 0);
        assert!(!controls.tick_limit_reached(999_999));
        assert!(!controls.time_limit_reached());
    }

    #[test]
    fn tick_limit_reached() {
        let controls = RunControls::from_config(&DriverConfig {
            max_ticks: 100,
            ..DriverConfig::default()
        });
        assert!(!controls.tick_limit_reached(99));
        assert!(controls.tick_limit_reached(100));
        assert!(controls.tick_limit_reached(101));
    }

    #[tokio::test]
    async fn stop_wakes_a_paused_loop() {
        let controls = Arc::new(RunControls::new(0, 0));
        controls.pause();

        let waiter = Arc::clone(&controls);
        let handle = tokio::spawn(async move { waiter.wait_if_paused().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        controls.request_stop();

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn resume_wakes_a_paused_loop() {
        let controls = Arc::new(RunControls::new(0, 0));
        controls.pause();

        let waiter = Arc::clone(&controls);
        let handle = tokio::spawn(async move { waiter.wait_if_paused().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        controls.resume();

        let joined = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(joined, Ok(Ok(()))));
    }
}
