//! Motion projector: writes one scalar coordinate of a body position.
//!
//! The projector is decoupled from the sequencer; it only knows which axis
//! it drives. Every other coordinate of the body is left untouched, so the
//! same body can be positioned freely on the other axes by its owner.

use sweeper_types::{Axis, Vec3};

/// Accessor for a positioned body owned by the host.
pub trait Body {
    /// Current world position.
    fn position(&self) -> Vec3;

    /// Overwrite one coordinate of the world position.
    fn set_axis(&mut self, axis: Axis, value: f64);

    /// Overwrite the full world position.
    fn set_position(&mut self, position: Vec3) {
        self.set_axis(Axis::X, position.x);
        self.set_axis(Axis::Y, position.y);
        self.set_axis(Axis::Z, position.z);
    }
}

/// A plain in-memory body.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Vec3,
}

impl Transform {
    /// A transform at `position`.
    pub const fn at(position: Vec3) -> Self {
        Self { position }
    }
}

impl Body for Transform {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_axis(&mut self, axis: Axis, value: f64) {
        self.position = self.position.with(axis, value);
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }
}

/// Applies sequencer values to a single axis of a body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionProjector {
    axis: Axis,
}

impl MotionProjector {
    /// A projector driving `axis`.
    pub const fn new(axis: Axis) -> Self {
        Self { axis }
    }

    /// The axis this projector writes.
    pub const fn axis(&self) -> Axis {
        self.axis
    }

    /// Write `value` to the projector's axis of `body`.
    pub fn apply(&self, body: &mut dyn Body, value: f64) {
        body.set_axis(self.axis, value);
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn apply_writes_only_its_axis() {
        let mut body = Transform::at(Vec3::new(1.0, 2.0, 3.0));
        MotionProjector::new(Axis::Y).apply(&mut body, 7.5);
        assert_eq!(body.position(), Vec3::new(1.0, 7.5, 3.0));

        MotionProjector::new(Axis::Z).apply(&mut body, -1.0);
        assert_eq!(body.position(), Vec3::new(1.0, 7.5, -1.0));
    }

    #[test]
    fn default_projector_drives_y() {
        assert_eq!(MotionProjector::default().axis(), Axis::Y);
    }

    #[test]
    fn set_position_overwrites_everything() {
        let mut body = Transform::default();
        body.set_position(Vec3::new(4.0, 5.0, 6.0));
        assert_eq!(body.position().x, 4.0);
        assert_eq!(body.position().z, 6.0);
    }
}
