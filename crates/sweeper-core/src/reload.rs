//! Reload trigger: a cancellable, delayed, one-shot reset request.
//!
//! After a kill or a goal, the scene waits long enough for external
//! feedback (a UI blink, a sound) to play out and then asks the host to
//! reset. The wait is `max(reload_delay, blink_duration)`.

use serde::{Deserialize, Serialize};
use sweeper_types::ReloadReason;
use tracing::{debug, info};

use crate::clock::{self, Countdown};

/// Receives the reset request once a reload fires.
pub trait ResetHandler {
    /// Reset the scene. Called at most once per scheduled reload.
    fn reset(&mut self, reason: ReloadReason);
}

/// A handler that remembers the reasons it was called with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingReset {
    /// Every reason received, in order.
    pub calls: Vec<ReloadReason>,
}

impl ResetHandler for RecordingReset {
    fn reset(&mut self, reason: ReloadReason) {
        self.calls.push(reason);
    }
}

/// Delay policy shared by hazards and goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReloadPolicy {
    /// Minimum seconds before the reload.
    #[serde(default = "default_reload_delay")]
    pub reload_delay: f64,
    /// Duration of the external blink effect, if one is layered on top.
    #[serde(default)]
    pub blink_duration: Option<f64>,
}

const fn default_reload_delay() -> f64 {
    0.35
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self {
            reload_delay: default_reload_delay(),
            blink_duration: None,
        }
    }
}

impl ReloadPolicy {
    /// Seconds to wait: `max(reload_delay, blink_duration)`, never negative.
    pub fn effective_delay(&self) -> f64 {
        let reload = clock::clamp_wait(self.reload_delay);
        let blink = self.blink_duration.map_or(0.0, clock::clamp_wait);
        reload.max(blink)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    countdown: Countdown,
    reason: ReloadReason,
}

/// A single pending reload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReloadTrigger {
    pending: Option<Pending>,
}

impl ReloadTrigger {
    /// A trigger with nothing scheduled.
    pub const fn new() -> Self {
        Self { pending: None }
    }

    /// Schedule a reset after `delay` seconds, replacing any pending one.
    pub fn schedule(&mut self, delay: f64, reason: ReloadReason) {
        if self.pending.is_some() {
            debug!(?reason, "Superseding pending reload");
        }
        self.pending = Some(Pending {
            countdown: Countdown::new(delay),
            reason,
        });
    }

    /// Drop the pending reset, if any. Returns whether one was pending.
    pub const fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a reset is waiting to fire.
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds until the pending reset fires.
    pub fn remaining(&self) -> Option<f64> {
        self.pending.map(|p| p.countdown.remaining())
    }

    /// Advance the timer; calls `handler` once when the delay has elapsed.
    ///
    /// Returns the reason if the reset fired during this call.
    pub fn tick(&mut self, dt: f64, handler: &mut dyn ResetHandler) -> Option<ReloadReason> {
        let pending = self.pending.as_mut()?;
        if !pending.countdown.advance(dt) {
            return None;
        }
        let reason = pending.reason;
        self.pending = None;
        info!(?reason, "Reload firing");
        handler.reset(reason);
        Some(reason)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn effective_delay_takes_the_longer_wait() {
        let policy = ReloadPolicy {
            reload_delay: 0.35,
            blink_duration: Some(0.6),
        };
        assert_eq!(policy.effective_delay(), 0.6);

        let policy = ReloadPolicy {
            reload_delay: 1.0,
            blink_duration: Some(0.6),
        };
        assert_eq!(policy.effective_delay(), 1.0);

        let policy = ReloadPolicy {
            reload_delay: -1.0,
            blink_duration: None,
        };
        assert_eq!(policy.effective_delay(), 0.0);
    }

    #[test]
    fn fires_once_after_delay() {
        let mut trigger = ReloadTrigger::new();
        let mut handler = RecordingReset::default();
        trigger.schedule(0.5, ReloadReason::Killed);

        assert_eq!(trigger.tick(0.25, &mut handler), None);
        assert_eq!(trigger.tick(0.25, &mut handler), Some(ReloadReason::Killed));
        assert_eq!(trigger.tick(1.0, &mut handler), None);
        assert_eq!(handler.calls, vec![ReloadReason::Killed]);
        assert!(!trigger.is_pending());
    }

    #[test]
    fn zero_delay_fires_on_next_tick() {
        let mut trigger = ReloadTrigger::new();
        let mut handler = RecordingReset::default();
        trigger.schedule(0.0, ReloadReason::GoalReached);
        assert_eq!(trigger.tick(0.0, &mut handler), Some(ReloadReason::GoalReached));
    }

    #[test]
    fn cancel_prevents_firing() {
        let mut trigger = ReloadTrigger::new();
        let mut handler = RecordingReset::default();
        trigger.schedule(0.1, ReloadReason::Killed);
        assert!(trigger.cancel());
        assert!(!trigger.cancel());
        assert_eq!(trigger.tick(1.0, &mut handler), None);
        assert!(handler.calls.is_empty());
    }

    #[test]
    fn schedule_supersedes_pending() {
        let mut trigger = ReloadTrigger::new();
        let mut handler = RecordingReset::default();
        trigger.schedule(0.1, ReloadReason::Killed);
        trigger.schedule(1.0, ReloadReason::GoalReached);
        assert_eq!(trigger.remaining(), Some(1.0));
        assert_eq!(trigger.tick(0.5, &mut handler), None);
        assert_eq!(trigger.tick(0.5, &mut handler), Some(ReloadReason::GoalReached));
        assert_eq!(handler.calls, vec![ReloadReason::GoalReached]);
    }
}
