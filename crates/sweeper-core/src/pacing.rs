//! Frame pacing: the fixed rate at which the runner issues ticks.

use std::time::Duration;

/// Lowest accepted target rate, in frames per second.
pub const MIN_FPS: u32 = 15;

/// Highest accepted target rate, in frames per second.
pub const MAX_FPS: u32 = 240;

/// Target frame rate, clamped to `[MIN_FPS, MAX_FPS]` and optionally to the
/// monitor's refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePacer {
    fps: u32,
}

impl FramePacer {
    /// Pace at `target_fps`, clamped to the supported range.
    pub fn new(target_fps: u32) -> Self {
        Self {
            fps: target_fps.clamp(MIN_FPS, MAX_FPS),
        }
    }

    /// Never exceed `refresh_hz`. A zero refresh rate is ignored.
    #[must_use]
    pub fn clamp_to_monitor(self, refresh_hz: u32) -> Self {
        if refresh_hz == 0 {
            return self;
        }
        Self {
            fps: self.fps.min(refresh_hz),
        }
    }

    /// Effective frames per second.
    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Wall-clock time between ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(self.frame_delta())
    }

    /// Simulation seconds advanced by one tick.
    pub fn frame_delta(&self) -> f64 {
        f64::from(self.fps.max(1)).recip()
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn target_is_clamped_to_supported_range() {
        assert_eq!(FramePacer::new(5).fps(), MIN_FPS);
        assert_eq!(FramePacer::new(1000).fps(), MAX_FPS);
        assert_eq!(FramePacer::new(90).fps(), 90);
    }

    #[test]
    fn monitor_caps_the_rate() {
        assert_eq!(FramePacer::new(144).clamp_to_monitor(60).fps(), 60);
        assert_eq!(FramePacer::new(30).clamp_to_monitor(60).fps(), 30);
        assert_eq!(FramePacer::new(60).clamp_to_monitor(0).fps(), 60);
    }

    #[test]
    fn delta_matches_rate() {
        let pacer = FramePacer::new(50);
        assert_eq!(pacer.frame_delta(), 0.02);
        assert_eq!(pacer.frame_interval(), Duration::from_millis(20));
    }
}
