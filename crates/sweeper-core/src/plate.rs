//! Pressure plate: a trigger volume that sinks while occupied and drives a
//! linked door.
//!
//! The plate counts accepted activators inside its volume. The first entry
//! presses it and the last exit releases it. Pressing always commands the
//! door open; releasing may schedule a delayed close, which a new press
//! aborts.

use sweeper_events::EventSink;
use sweeper_types::{ContactEvent, ContactKind, EmitterId, SignalKind, SweepEvent, Vec3};
use tracing::{debug, info};

use crate::clock::{Countdown, Tween};
use crate::easing::{Easing, SharedCurve};
use crate::hazard::HazardFilter;
use crate::projector::Body;

/// An instruction for the door linked to a plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorCommand {
    /// Open the door.
    Open,
    /// Close the door.
    Close,
}

/// Tuning for a [`PressurePlate`].
#[derive(Debug, Clone)]
pub struct PlateConfig {
    /// Which activators press the plate.
    pub filter: HazardFilter,
    /// How far the visual sinks when pressed.
    pub press_depth: f64,
    /// Seconds to sink.
    pub press_time: f64,
    /// Seconds to rise back.
    pub release_time: f64,
    /// Curve applied while sinking.
    pub press_curve: SharedCurve,
    /// Curve applied while rising.
    pub release_curve: SharedCurve,
    /// Keep the door open once pressed.
    pub latch_door_open: bool,
    /// Close the door on release (ignored when latched).
    pub close_door_on_release: bool,
    /// Seconds between release and closing the door.
    pub door_close_delay: f64,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            filter: HazardFilter {
                tags: vec!["Player".to_owned(), "Crate".to_owned()],
                ..HazardFilter::any()
            },
            press_depth: 0.06,
            press_time: 0.12,
            release_time: 0.15,
            press_curve: Easing::EaseInOut.shared(),
            release_curve: Easing::EaseInOut.shared(),
            latch_door_open: true,
            close_door_on_release: false,
            door_close_delay: 0.25,
        }
    }
}

#[derive(Debug, Clone)]
struct Motion {
    from: Vec3,
    to: Vec3,
    tween: Tween,
    curve: SharedCurve,
}

/// A pressure plate with its visual body.
#[derive(Debug)]
pub struct PressurePlate<B> {
    id: EmitterId,
    name: String,
    config: PlateConfig,
    rest: Vec3,
    inside_count: u32,
    pressed: bool,
    motion: Option<Motion>,
    pending_close: Option<Countdown>,
    visual: B,
}

impl<B: Body> PressurePlate<B> {
    /// Create a released plate; its rest position is the visual's current
    /// position.
    pub fn new(name: impl Into<String>, visual: B, config: PlateConfig) -> Self {
        Self {
            id: EmitterId::new(),
            name: name.into(),
            rest: visual.position(),
            config,
            inside_count: 0,
            pressed: false,
            motion: None,
            pending_close: None,
            visual,
        }
    }

    /// Emitter id stamped on this plate's events.
    pub const fn id(&self) -> EmitterId {
        self.id
    }

    /// Configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the plate is pressed.
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Number of accepted activators inside the volume.
    pub const fn inside_count(&self) -> u32 {
        self.inside_count
    }

    /// Whether the visual is still travelling.
    pub const fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    /// Whether a door close is waiting.
    pub const fn close_pending(&self) -> bool {
        self.pending_close.is_some()
    }

    /// The visual body.
    pub const fn visual(&self) -> &B {
        &self.visual
    }

    /// Rest position of the visual.
    pub const fn rest_position(&self) -> Vec3 {
        self.rest
    }

    /// Evaluate a contact; returns a door command if the state changed.
    pub fn on_contact(
        &mut self,
        event: &ContactEvent,
        now: f64,
        sink: &mut dyn EventSink,
    ) -> Option<DoorCommand> {
        if !self.config.filter.accepts(&event.activator) {
            return None;
        }
        match event.kind {
            ContactKind::Enter => {
                self.inside_count = self.inside_count.saturating_add(1);
                if self.pressed {
                    None
                } else {
                    self.set_pressed(true, now, sink)
                }
            }
            ContactKind::Exit => {
                self.inside_count = self.inside_count.saturating_sub(1);
                if self.inside_count == 0 && self.pressed {
                    self.set_pressed(false, now, sink)
                } else {
                    None
                }
            }
        }
    }

    fn set_pressed(&mut self, pressed: bool, now: f64, sink: &mut dyn EventSink) -> Option<DoorCommand> {
        self.pressed = pressed;
        self.pending_close = None;

        let (target, duration, curve) = if pressed {
            (
                self.rest + Vec3::DOWN.scale(self.config.press_depth),
                self.config.press_time,
                self.config.press_curve.clone(),
            )
        } else {
            (self.rest, self.config.release_time, self.config.release_curve.clone())
        };
        self.motion = Some(Motion {
            from: self.visual.position(),
            to: target,
            tween: Tween::new(duration),
            curve,
        });

        if pressed {
            info!(name = %self.name, inside = self.inside_count, "Plate pressed");
            sink.emit(SweepEvent::new(self.id, SignalKind::Pressed, now));
            return Some(DoorCommand::Open);
        }

        info!(name = %self.name, "Plate released");
        sink.emit(SweepEvent::new(self.id, SignalKind::Released, now));
        if self.config.latch_door_open || !self.config.close_door_on_release {
            return None;
        }
        let countdown = Countdown::new(self.config.door_close_delay);
        if countdown.is_done() {
            return Some(DoorCommand::Close);
        }
        debug!(name = %self.name, delay = countdown.remaining(), "Door close scheduled");
        self.pending_close = Some(countdown);
        None
    }

    /// Advance the visual tween and the pending door close.
    pub fn tick(&mut self, dt: f64) -> Option<DoorCommand> {
        if let Some(motion) = self.motion.as_mut() {
            motion.tween.advance(dt);
            if motion.tween.is_finished() {
                let target = motion.to;
                self.motion = None;
                self.visual.set_position(target);
            } else {
                let k = motion.tween.eased(motion.curve.as_ref());
                let position = motion.from.lerp_unclamped(motion.to, k);
                self.visual.set_position(position);
            }
        }

        let countdown = self.pending_close.as_mut()?;
        if !countdown.advance(dt) {
            return None;
        }
        self.pending_close = None;
        (!self.pressed).then_some(DoorCommand::Close)
    }
}
