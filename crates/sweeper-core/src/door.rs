//! Sliding door: a panel tweened between a closed and an open position.
//!
//! `open()` and `close()` are idempotent. Each effective command restarts
//! the tween from wherever the panel currently is, so reversing mid-motion
//! never jumps.

use sweeper_events::EventSink;
use sweeper_types::{EmitterId, SignalKind, SweepEvent, Vec3};
use tracing::debug;

use crate::clock::Tween;
use crate::easing::SharedCurve;
use crate::projector::Body;

/// Seconds a door takes to open or close by default.
pub const DEFAULT_MOVE_TIME: f64 = 0.6;

#[derive(Debug, Clone, Copy)]
struct Motion {
    from: Vec3,
    to: Vec3,
    tween: Tween,
}

/// A two-state sliding door driving its panel body.
#[derive(Debug)]
pub struct SlidingDoor<B> {
    id: EmitterId,
    name: String,
    closed: Vec3,
    open: Vec3,
    move_time: f64,
    ease: SharedCurve,
    is_open: bool,
    motion: Option<Motion>,
    panel: B,
}

impl<B: Body> SlidingDoor<B> {
    /// Create a door whose closed position is the panel's current position.
    ///
    /// With `start_closed` unset the panel is placed at the open position
    /// immediately.
    pub fn new(
        name: impl Into<String>,
        mut panel: B,
        open_offset: Vec3,
        move_time: f64,
        ease: SharedCurve,
        start_closed: bool,
    ) -> Self {
        let closed = panel.position();
        let open = closed + open_offset;
        if !start_closed {
            panel.set_position(open);
        }
        Self {
            id: EmitterId::new(),
            name: name.into(),
            closed,
            open,
            move_time,
            ease,
            is_open: !start_closed,
            motion: None,
            panel,
        }
    }

    /// Emitter id stamped on this door's events.
    pub const fn id(&self) -> EmitterId {
        self.id
    }

    /// Configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the door was last commanded open.
    pub const fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether the panel is still travelling.
    pub const fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    /// The panel body.
    pub const fn panel(&self) -> &B {
        &self.panel
    }

    /// Closed panel position.
    pub const fn closed_position(&self) -> Vec3 {
        self.closed
    }

    /// Open panel position.
    pub const fn open_position(&self) -> Vec3 {
        self.open
    }

    /// Start opening. No-op if already open.
    pub fn open(&mut self, now: f64, sink: &mut dyn EventSink) {
        if self.is_open {
            return;
        }
        self.is_open = true;
        self.start_move(self.open);
        sink.emit(SweepEvent::new(self.id, SignalKind::DoorOpened, now));
    }

    /// Start closing. No-op if already closed.
    pub fn close(&mut self, now: f64, sink: &mut dyn EventSink) {
        if !self.is_open {
            return;
        }
        self.is_open = false;
        self.start_move(self.closed);
        sink.emit(SweepEvent::new(self.id, SignalKind::DoorClosed, now));
    }

    fn start_move(&mut self, target: Vec3) {
        debug!(name = %self.name, open = self.is_open, "Door moving");
        self.motion = Some(Motion {
            from: self.panel.position(),
            to: target,
            tween: Tween::new(self.move_time),
        });
    }

    /// Advance the panel tween by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        let Some(motion) = self.motion.as_mut() else {
            return;
        };
        motion.tween.advance(dt);
        if motion.tween.is_finished() {
            let target = motion.to;
            self.motion = None;
            self.panel.set_position(target);
        } else {
            let k = motion.tween.eased(self.ease.as_ref());
            let position = motion.from.lerp_unclamped(motion.to, k);
            self.panel.set_position(position);
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use sweeper_events::RecordingSink;

    use super::*;
    use crate::easing::Easing;
    use crate::projector::Transform;

    fn door(start_closed: bool) -> SlidingDoor<Transform> {
        SlidingDoor::new(
            "gate",
            Transform::at(Vec3::new(1.0, 0.0, 0.0)),
            Vec3::new(0.0, 0.0, -2.0),
            1.0,
            Easing::Linear.shared(),
            start_closed,
        )
    }

    #[test]
    fn starts_open_when_asked() {
        let d = door(false);
        assert!(d.is_open());
        assert_eq!(d.panel().position, Vec3::new(1.0, 0.0, -2.0));
        assert_eq!(d.closed_position(), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn open_tweens_to_open_position() {
        let mut d = door(true);
        let mut sink = RecordingSink::new();
        d.open(0.0, &mut sink);
        d.tick(0.5);
        assert_eq!(d.panel().position.z, -1.0);
        d.tick(0.5);
        assert_eq!(d.panel().position, d.open_position());
        assert!(!d.is_moving());
        assert_eq!(sink.events()[0].kind, SignalKind::DoorOpened);
    }

    #[test]
    fn commands_are_idempotent() {
        let mut d = door(true);
        let mut sink = RecordingSink::new();
        d.close(0.0, &mut sink);
        assert!(sink.is_empty());
        assert!(!d.is_moving());

        d.open(0.0, &mut sink);
        d.open(0.1, &mut sink);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn reversal_starts_from_current_position() {
        let mut d = door(true);
        let mut sink = RecordingSink::new();
        d.open(0.0, &mut sink);
        d.tick(0.5);
        d.close(0.5, &mut sink);
        d.tick(0.5);
        assert_eq!(d.panel().position.z, -0.5);
        d.tick(0.5);
        assert_eq!(d.panel().position, d.closed_position());
    }
}
