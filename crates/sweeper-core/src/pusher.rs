//! Pusher: horizontal shove applied to dynamic bodies a character walks into.
//!
//! The scene tick owns no character or rigid bodies, so nothing here is
//! driven from [`run_tick`]. Hosts call [`push_velocity`] from their own
//! collision callback and load [`PushConfig`] with the rest of their tuning.
//!
//! [`run_tick`]: crate::tick::run_tick

use serde::{Deserialize, Serialize};
use sweeper_types::Vec3;

/// Horizontal move directions shorter than this (squared) are ignored.
const MIN_DIRECTION_SQUARED: f64 = 1e-4;

/// Pusher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PushConfig {
    /// Horizontal speed given to the pushed body, in units per second.
    #[serde(default = "default_push_speed")]
    pub push_speed: f64,
    /// Hits whose normal points further up than this are not pushed.
    #[serde(default = "default_min_horizontal_dot")]
    pub min_horizontal_dot: f64,
}

const fn default_push_speed() -> f64 {
    2.2
}

const fn default_min_horizontal_dot() -> f64 {
    0.5
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            push_speed: default_push_speed(),
            min_horizontal_dot: default_min_horizontal_dot(),
        }
    }
}

/// A collision between the character and another body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PushHit {
    /// Whether the other body is kinematic (not pushable).
    pub kinematic: bool,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// Direction the character was moving.
    pub move_direction: Vec3,
}

/// Velocity to give the hit body, or `None` when it should not be pushed.
///
/// The vertical component of `current_velocity` is preserved.
pub fn push_velocity(hit: &PushHit, current_velocity: Vec3, config: &PushConfig) -> Option<Vec3> {
    if hit.kinematic {
        return None;
    }
    if Vec3::UP.dot(hit.normal) > config.min_horizontal_dot {
        return None;
    }
    let horizontal = Vec3::new(hit.move_direction.x, 0.0, hit.move_direction.z);
    if horizontal.length_squared() < MIN_DIRECTION_SQUARED {
        return None;
    }
    let dir = horizontal.normalized()?;
    Some(Vec3::new(
        dir.x * config.push_speed,
        current_velocity.y,
        dir.z * config.push_speed,
    ))
}
