//! Easing curves mapping normalized time to an eased interpolation factor.
//!
//! A curve maps `t` in `[0, 1]` to `k`. Built-in curves satisfy
//! `k(0) = 0` and `k(1) = 1`; keyframe curves may overshoot either bound.
//! Curves are pure and immutable, so one instance is shared (via [`Arc`])
//! by every component configured with it.
//!
//! [`Arc`]: std::sync::Arc

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A pure mapping from normalized time to an eased value.
pub trait EasingCurve: core::fmt::Debug + Send + Sync {
    /// Evaluate the curve at `t`. Callers pass `t` in `[0, 1]`.
    fn evaluate(&self, t: f64) -> f64;
}

/// A shared, immutable easing curve.
pub type SharedCurve = Arc<dyn EasingCurve>;

/// One key of a [`Easing::Keyframes`] curve.
///
/// Segments between keys are cubic Hermite splines using the outgoing
/// tangent of the left key and the incoming tangent of the right key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Normalized time of the key.
    pub time: f64,
    /// Curve value at the key.
    pub value: f64,
    /// Slope arriving at the key.
    #[serde(default)]
    pub in_tangent: f64,
    /// Slope leaving the key.
    #[serde(default)]
    pub out_tangent: f64,
}

impl Keyframe {
    /// A key with flat tangents.
    pub const fn flat(time: f64, value: f64) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }
}

/// Built-in easing curves, selectable from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "curve", rename_all = "snake_case")]
pub enum Easing {
    /// `k = t`.
    Linear,
    /// Quadratic ease-in, `k = t^2`.
    EaseIn,
    /// Quadratic ease-out, `k = t(2 - t)`.
    EaseOut,
    /// Hermite curve from (0, 0) to (1, 1) with flat tangents,
    /// `k = 3t^2 - 2t^3`.
    #[default]
    EaseInOut,
    /// Quintic smootherstep, `k = 6t^5 - 15t^4 + 10t^3`.
    SmootherStep,
    /// Arbitrary Hermite keyframe curve. Values outside the key range clamp
    /// to the first/last key.
    Keyframes {
        /// Keys, in any order. Unsorted keys are ordered by time before
        /// evaluation.
        keys: Vec<Keyframe>,
    },
}

impl Easing {
    /// A keyframe curve with its keys sorted by time.
    pub fn keyframes(mut keys: Vec<Keyframe>) -> Self {
        sort_keys(&mut keys);
        Self::Keyframes { keys }
    }

    /// Wrap this curve for sharing. Keyframes are sorted once here.
    pub fn shared(self) -> SharedCurve {
        match self {
            Self::Keyframes { keys } => Arc::new(Self::keyframes(keys)),
            other => Arc::new(other),
        }
    }
}

fn sort_keys(keys: &mut [Keyframe]) {
    keys.sort_by(|a, b| a.time.total_cmp(&b.time));
}

fn keys_sorted(keys: &[Keyframe]) -> bool {
    keys.is_sorted_by(|a, b| a.time.total_cmp(&b.time).is_le())
}

impl EasingCurve for Easing {
    fn evaluate(&self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => t * t * (3.0 - 2.0 * t),
            Self::SmootherStep => t * t * t * (t * (t * 6.0 - 15.0) + 10.0),
            Self::Keyframes { keys } if keys_sorted(keys) => evaluate_keys(keys, t),
            Self::Keyframes { keys } => {
                let mut sorted = keys.clone();
                sort_keys(&mut sorted);
                evaluate_keys(&sorted, t)
            }
        }
    }
}

/// Evaluate a sorted keyframe list at `t`.
fn evaluate_keys(keys: &[Keyframe], t: f64) -> f64 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return t;
    };
    if t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }

    for pair in keys.windows(2) {
        let [k0, k1] = pair else {
            continue;
        };
        if t > k1.time {
            continue;
        }
        let span = k1.time - k0.time;
        if span <= 0.0 {
            return k1.value;
        }
        let s = (t - k0.time) / span;
        let s2 = s * s;
        let s3 = s2 * s;
        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;
        return h00 * k0.value
            + h10 * span * k0.out_tangent
            + h01 * k1.value
            + h11 * span * k1.in_tangent;
    }
    last.value
}

/// Adapter turning a closure into an [`EasingCurve`].
pub struct FnCurve<F> {
    name: &'static str,
    f: F,
}

impl<F> FnCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    /// Wrap `f`, labelled `name` in debug output.
    pub const fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> core::fmt::Debug for FnCurve<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("FnCurve").field(&self.name).finish()
    }
}

impl<F> EasingCurve for FnCurve<F>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn evaluate(&self, t: f64) -> f64 {
        (self.f)(t)
    }
}
