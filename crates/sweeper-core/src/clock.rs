//! Easing clock: eased progress over a fixed duration.
//!
//! The clock is a pure function of absolute elapsed time, so a caller that
//! keeps the elapsed time for the current interpolation can evaluate it
//! every tick without accumulating drift in the eased value.
//!
//! # Guarantees
//!
//! - `total` is clamped to at least [`MIN_DURATION`]; there is no division
//!   by zero for malformed durations.
//! - `elapsed` is clamped to `[0, total]` before normalization, so the
//!   normalized time at or past the end is exactly `1.0`.

use crate::easing::EasingCurve;

/// Smallest duration accepted anywhere in the core, in seconds.
///
/// Non-positive or non-finite durations are coerced to this value.
pub const MIN_DURATION: f64 = 1e-4;

/// Coerce a configured duration to a usable positive value.
pub fn clamp_duration(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > MIN_DURATION {
        seconds
    } else {
        MIN_DURATION
    }
}

/// Coerce a configured wait to a non-negative value. Zero means "skip".
pub fn clamp_wait(seconds: f64) -> f64 {
    if seconds.is_finite() && seconds > 0.0 {
        seconds
    } else {
        0.0
    }
}

/// Normalized progress `elapsed / total`, clamped to `[0, 1]`.
///
/// `NaN` elapsed counts as zero; `+inf` counts as complete.
pub fn normalized(elapsed: f64, total: f64) -> f64 {
    let total = clamp_duration(total);
    let elapsed = if elapsed.is_nan() {
        0.0
    } else {
        elapsed.clamp(0.0, total)
    };
    elapsed / total
}

/// Evaluate the eased progress of an interpolation.
pub fn evaluate(elapsed: f64, total: f64, curve: &dyn EasingCurve) -> f64 {
    curve.evaluate(normalized(elapsed, total))
}

/// Interpolate a scalar by `k` without clamping `k`.
pub fn lerp_unclamped(from: f64, to: f64, k: f64) -> f64 {
    from + (to - from) * k
}

/// Timing of one tick: the step size and the simulation time at its end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    dt: f64,
    now: f64,
}

impl FrameTime {
    /// A frame advancing `dt` seconds and ending at `now`.
    ///
    /// Negative or non-finite deltas become zero.
    pub fn new(dt: f64, now: f64) -> Self {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        Self { dt, now }
    }

    /// Seconds advanced by this frame.
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// Simulation time at the end of this frame.
    pub const fn now(&self) -> f64 {
        self.now
    }
}

/// A single timed interpolation from `0` to `1` over a fixed duration.
///
/// The tween tracks absolute elapsed time. Callers map its eased factor onto
/// whatever they are interpolating and snap to the exact target once
/// [`Tween::is_finished`] reports completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    elapsed: f64,
    duration: f64,
}

impl Tween {
    /// Start a tween of `duration` seconds (clamped to [`MIN_DURATION`]).
    pub fn new(duration: f64) -> Self {
        Self {
            elapsed: 0.0,
            duration: clamp_duration(duration),
        }
    }

    /// Advance by `dt` seconds. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    /// Elapsed time in seconds (may exceed the duration).
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Clamped duration in seconds.
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Whether the full duration has elapsed.
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Eased progress under `curve`.
    pub fn eased(&self, curve: &dyn EasingCurve) -> f64 {
        evaluate(self.elapsed, self.duration, curve)
    }
}

/// A countdown that completes once a wait has elapsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    remaining: f64,
}

impl Countdown {
    /// Start a countdown of `seconds` (negative counts as zero).
    pub fn new(seconds: f64) -> Self {
        Self {
            remaining: clamp_wait(seconds),
        }
    }

    /// Advance by `dt`; returns `true` once the wait is over.
    pub fn advance(&mut self, dt: f64) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.remaining -= dt;
        }
        self.is_done()
    }

    /// Whether the wait is over.
    pub fn is_done(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Seconds left, never negative.
    pub fn remaining(&self) -> f64 {
        self.remaining.max(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    #[test]
    fn evaluate_at_total_is_exactly_one() {
        for total in [0.1, 0.3, 2.0, 2.5, 7.77] {
            assert_eq!(evaluate(total, total, &Easing::Linear), 1.0);
            assert_eq!(evaluate(total, total, &Easing::EaseInOut), 1.0);
        }
    }

    #[test]
    fn evaluate_clamps_elapsed() {
        assert_eq!(evaluate(-1.0, 2.0, &Easing::Linear), 0.0);
        assert_eq!(evaluate(5.0, 2.0, &Easing::Linear), 1.0);
        assert_eq!(evaluate(f64::NAN, 2.0, &Easing::Linear), 0.0);
        assert_eq!(evaluate(f64::INFINITY, 2.0, &Easing::Linear), 1.0);
    }

    #[test]
    fn evaluate_guards_zero_total() {
        let k = evaluate(0.5, 0.0, &Easing::Linear);
        assert_eq!(k, 1.0);
        let k = evaluate(0.0, -3.0, &Easing::Linear);
        assert_eq!(k, 0.0);
    }

    #[test]
    fn evaluate_is_monotonic_for_monotonic_curve() {
        let total = 2.0;
        let mut prev = 0.0;
        for step in 0..=200 {
            let elapsed = f64::from(step) * total / 200.0;
            let k = evaluate(elapsed, total, &Easing::EaseInOut);
            assert!(k >= prev);
            prev = k;
        }
    }

    #[test]
    fn clamp_duration_coerces_bad_values() {
        assert_eq!(clamp_duration(0.0), MIN_DURATION);
        assert_eq!(clamp_duration(-1.0), MIN_DURATION);
        assert_eq!(clamp_duration(f64::NAN), MIN_DURATION);
        assert_eq!(clamp_duration(2.5), 2.5);
    }

    #[test]
    fn tween_finishes_after_duration() {
        let mut tween = Tween::new(1.0);
        tween.advance(0.4);
        assert!(!tween.is_finished());
        assert!((tween.eased(&Easing::Linear) - 0.4).abs() < 1e-12);
        tween.advance(0.6);
        assert!(tween.is_finished());
        assert_eq!(tween.eased(&Easing::Linear), 1.0);
    }

    #[test]
    fn tween_ignores_negative_delta() {
        let mut tween = Tween::new(1.0);
        tween.advance(-0.5);
        tween.advance(f64::NAN);
        assert_eq!(tween.elapsed(), 0.0);
    }

    #[test]
    fn countdown_zero_is_immediately_done() {
        let mut c = Countdown::new(0.0);
        assert!(c.is_done());
        assert!(c.advance(0.0));
        let mut c = Countdown::new(0.5);
        assert!(!c.advance(0.25));
        assert!(c.advance(0.25));
        assert_eq!(c.remaining(), 0.0);
    }

    #[test]
    fn frame_time_sanitizes_delta() {
        assert_eq!(FrameTime::new(-0.1, 1.0).dt(), 0.0);
        assert_eq!(FrameTime::new(f64::NAN, 1.0).dt(), 0.0);
        assert_eq!(FrameTime::new(0.02, 1.0).dt(), 0.02);
    }

    #[test]
    fn lerp_unclamped_extrapolates() {
        assert_eq!(lerp_unclamped(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp_unclamped(0.0, 10.0, 1.5), 15.0);
        assert_eq!(lerp_unclamped(10.0, 0.0, 1.0), 0.0);
    }
}
