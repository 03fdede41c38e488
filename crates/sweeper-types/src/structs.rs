//! Core value structs: positions, activators, contacts, and events.

use serde::{Deserialize, Serialize};

use crate::enums::{Axis, ContactKind, SignalKind};
use crate::ids::{ActivatorId, EmitterId};

/// Squared length below which a vector is treated as zero.
const ZERO_LENGTH_SQUARED: f64 = 1e-8;

// ---------------------------------------------------------------------------
// Vec3
// ---------------------------------------------------------------------------

/// A three-component world-space vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// World up.
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    /// World down.
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);

    /// Create a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Read one coordinate.
    pub const fn get(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Return a copy with one coordinate replaced.
    #[must_use]
    pub const fn with(self, axis: Axis, value: f64) -> Self {
        match axis {
            Axis::X => Self::new(value, self.y, self.z),
            Axis::Y => Self::new(self.x, value, self.z),
            Axis::Z => Self::new(self.x, self.y, value),
        }
    }

    /// Scale every component by `factor`.
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Dot product.
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared length.
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Self> {
        let len_sq = self.length_squared();
        if len_sq < ZERO_LENGTH_SQUARED {
            return None;
        }
        Some(self.scale(len_sq.sqrt().recip()))
    }

    /// Interpolate towards `to` by `k` without clamping `k`.
    #[must_use]
    pub fn lerp_unclamped(self, to: Self, k: f64) -> Self {
        Self::new(
            self.x + (to.x - self.x) * k,
            self.y + (to.y - self.y) * k,
            self.z + (to.z - self.z) * k,
        )
    }
}

impl core::ops::Add for Vec3 {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Descriptor of an entity touching a trigger volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activator {
    /// Identity of the activator.
    #[serde(default)]
    pub id: ActivatorId,
    /// Tag assigned to the activator (e.g. `"Player"`, `"Crate"`).
    pub tag: String,
    /// Physics layer index (0..=31).
    #[serde(default)]
    pub layer: u8,
}

impl Activator {
    /// Create an activator with a fresh id.
    pub fn new(tag: impl Into<String>, layer: u8) -> Self {
        Self {
            id: ActivatorId::new(),
            tag: tag.into(),
            layer,
        }
    }
}

/// A contact reported by the external trigger source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Who touched the volume.
    pub activator: Activator,
    /// Whether the activator entered or left.
    #[serde(default)]
    pub kind: ContactKind,
    /// Simulation time of the contact, in seconds.
    #[serde(default)]
    pub timestamp: f64,
}

impl ContactEvent {
    /// An `Enter` contact at `timestamp`.
    pub const fn enter(activator: Activator, timestamp: f64) -> Self {
        Self {
            activator,
            kind: ContactKind::Enter,
            timestamp,
        }
    }

    /// An `Exit` contact at `timestamp`.
    pub const fn exit(activator: Activator, timestamp: f64) -> Self {
        Self {
            activator,
            kind: ContactKind::Exit,
            timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A notification delivered to an event sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEvent {
    /// The scene object that emitted the event.
    pub source: EmitterId,
    /// What happened.
    pub kind: SignalKind,
    /// Simulation time at emission, in seconds.
    pub at: f64,
}

impl SweepEvent {
    /// Create an event.
    pub const fn new(source: EmitterId, kind: SignalKind, at: f64) -> Self {
        Self { source, kind, at }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn with_replaces_single_axis() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(v.with(Axis::Y, 9.0), Vec3::new(1.0, 9.0, 3.0));
        assert_eq!(v.with(Axis::X, 0.0).get(Axis::X), 0.0);
        assert_eq!(v.get(Axis::Z), 3.0);
    }

    #[test]
    fn add_is_component_wise() {
        let sum = Vec3::new(1.0, 2.0, 3.0) + Vec3::new(0.5, -2.0, 1.0);
        assert_eq!(sum, Vec3::new(1.5, 0.0, 4.0));
    }

    #[test]
    fn normalized_rejects_zero() {
        assert!(Vec3::ZERO.normalized().is_none());
        let n = Vec3::new(3.0, 0.0, 4.0).normalized().unwrap();
        assert!((n.length_squared() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn lerp_unclamped_overshoots() {
        let a = Vec3::ZERO;
        let b = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(a.lerp_unclamped(b, 0.5).x, 1.0);
        assert_eq!(a.lerp_unclamped(b, 1.5).x, 3.0);
    }

    #[test]
    fn contact_event_deserializes_with_defaults() {
        let json = r#"{"activator":{"tag":"Player"}}"#;
        let event: ContactEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, ContactKind::Enter);
        assert_eq!(event.activator.layer, 0);
        assert_eq!(event.timestamp, 0.0);
    }
}
