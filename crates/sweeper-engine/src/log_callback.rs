//! Tick callback that reports scene progress through `tracing`.

use sweeper_core::runner::TickCallback;
use sweeper_core::tick::{SceneState, TickSummary};
use tracing::{debug, info};

/// Logs every tick at debug level and a status line every `report_every`
/// ticks (0 disables the status line).
#[derive(Debug, Default)]
pub struct LoggingCallback {
    report_every: u64,
    kills: u64,
    goals_reached: u64,
}

impl LoggingCallback {
    /// Create a callback that reports every `report_every` ticks.
    pub const fn new(report_every: u64) -> Self {
        Self {
            report_every,
            kills: 0,
            goals_reached: 0,
        }
    }

    /// Kills seen across the whole run.
    pub const fn kills(&self) -> u64 {
        self.kills
    }

    /// Goals reached across the whole run.
    pub const fn goals_reached(&self) -> u64 {
        self.goals_reached
    }
}

impl TickCallback for LoggingCallback {
    fn on_tick(&mut self, summary: &TickSummary, state: &SceneState) {
        self.kills = self.kills.saturating_add(u64::from(summary.kills));
        self.goals_reached = self
            .goals_reached
            .saturating_add(u64::from(summary.goals_reached));

        debug!(
            tick = summary.tick,
            time = summary.time,
            moving = summary.moving,
            legs_completed = summary.legs_completed,
            kills = summary.kills,
            goals_reached = summary.goals_reached,
            door_commands = summary.door_commands,
            "Tick complete"
        );

        if summary.tick.checked_rem(self.report_every) != Some(0) {
            return;
        }

        info!(
            tick = summary.tick,
            time = summary.time,
            total_kills = self.kills,
            total_goals = self.goals_reached,
            "Scene status"
        );
        for sweeper in state.sweepers() {
            debug!(
                name = %sweeper.name(),
                phase = ?sweeper.phase(),
                value = sweeper.sequencer().state().map(|s| s.current_value()),
                "Sweeper status"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sweeper_core::config::SceneConfig;

    use super::*;

    fn summary(tick: u64, kills: u32, goals_reached: u32) -> TickSummary {
        TickSummary {
            tick,
            time: 0.0,
            moving: 0,
            legs_completed: 0,
            kills,
            goals_reached,
            door_commands: 0,
            unknown_targets: 0,
            reload: None,
        }
    }

    #[test]
    fn totals_accumulate_across_ticks() {
        let state = SceneState::from_config(&SceneConfig::default()).unwrap();
        let mut callback = LoggingCallback::new(0);

        callback.on_tick(&summary(1, 1, 0), &state);
        callback.on_tick(&summary(2, 0, 1), &state);
        callback.on_tick(&summary(3, 2, 0), &state);

        assert_eq!(callback.kills(), 3);
        assert_eq!(callback.goals_reached(), 1);
    }
}
