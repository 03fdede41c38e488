//! Leg sequencer: the telegraph / move / pause cycle between two endpoints.
//!
//! A running sequencer cycles forever:
//!
//! 1. **Leg start** -- emits [`SignalKind::MoveEnd`] for the previous leg
//!    (the very first leg emits it too, before any motion has happened).
//! 2. **Telegraphing** -- emits [`SignalKind::Telegraph`] and waits
//!    `telegraph_lead` seconds. Skipped when the lead is zero.
//! 3. **Moving** -- emits [`SignalKind::MoveStart`] and interpolates from the
//!    leg's origin to its target over `leg_duration` with the easing clock.
//!    On completion the value snaps exactly to the target.
//! 4. **Paused** -- rests for `pause_duration` seconds, then flips direction
//!    and starts the next leg. Skipped when the pause is zero.
//!
//! The sequencer is stepped by an explicit [`LegSequencer::tick`]. A phase
//! that completes during a tick transitions within that tick, and any
//! zero-length phases that follow are traversed immediately; time left over
//! in the tick is not carried into the next timed phase.
//!
//! Equal endpoints make the sequencer degenerate: activation does nothing
//! and no events are ever emitted.

use sweeper_events::EventSink;
use sweeper_types::{Direction, EmitterId, Phase, SignalKind, SweepEvent};
use tracing::debug;

use crate::clock::{self, FrameTime};
use crate::easing::SharedCurve;

/// Endpoints closer than this are treated as equal.
pub const DEGENERATE_EPSILON: f64 = 1e-6;

/// Immutable, validated sweep configuration.
///
/// Durations are coerced at construction: `leg_duration` to at least
/// [`clock::MIN_DURATION`], waits to non-negative values.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    start_value: f64,
    end_value: f64,
    leg_duration: f64,
    pause_duration: f64,
    telegraph_lead: f64,
    snap_to_start: bool,
    easing: SharedCurve,
}

impl SweepConfig {
    /// Build a configuration, clamping malformed durations.
    pub fn new(
        start_value: f64,
        end_value: f64,
        leg_duration: f64,
        pause_duration: f64,
        telegraph_lead: f64,
        easing: SharedCurve,
    ) -> Self {
        Self {
            start_value,
            end_value,
            leg_duration: clock::clamp_duration(leg_duration),
            pause_duration: clock::clamp_wait(pause_duration),
            telegraph_lead: clock::clamp_wait(telegraph_lead),
            snap_to_start: true,
            easing,
        }
    }

    /// Whether activation snaps the value to `start_value` (default `true`).
    #[must_use]
    pub fn with_snap_to_start(mut self, snap: bool) -> Self {
        self.snap_to_start = snap;
        self
    }

    /// First endpoint.
    pub const fn start_value(&self) -> f64 {
        self.start_value
    }

    /// Second endpoint.
    pub const fn end_value(&self) -> f64 {
        self.end_value
    }

    /// Seconds for one leg (always positive).
    pub const fn leg_duration(&self) -> f64 {
        self.leg_duration
    }

    /// Seconds to rest at each endpoint.
    pub const fn pause_duration(&self) -> f64 {
        self.pause_duration
    }

    /// Seconds of warning before each leg.
    pub const fn telegraph_lead(&self) -> f64 {
        self.telegraph_lead
    }

    /// Whether activation snaps to the start value.
    pub const fn snap_to_start(&self) -> bool {
        self.snap_to_start
    }

    /// The easing curve applied to each leg.
    pub fn easing(&self) -> &SharedCurve {
        &self.easing
    }

    /// Whether the endpoints are equal within [`DEGENERATE_EPSILON`].
    pub fn is_degenerate(&self) -> bool {
        (self.start_value - self.end_value).abs() <= DEGENERATE_EPSILON
    }

    /// Origin and target of a leg travelling in `direction`.
    pub const fn leg_endpoints(&self, direction: Direction) -> (f64, f64) {
        match direction {
            Direction::Forward => (self.start_value, self.end_value),
            Direction::Backward => (self.end_value, self.start_value),
        }
    }
}

/// Run-time state of an active sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepState {
    phase: Phase,
    direction: Direction,
    elapsed: f64,
    current_value: f64,
    legs_completed: u64,
}

impl SweepState {
    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Direction of the current leg.
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Seconds spent in the current phase.
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Last projected value.
    pub const fn current_value(&self) -> f64 {
        self.current_value
    }

    /// Number of legs completed since activation.
    pub const fn legs_completed(&self) -> u64 {
        self.legs_completed
    }
}

/// Result of [`LegSequencer::activate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// The cycle started; `value` is the position to project now.
    Started {
        /// Value to write to the body.
        value: f64,
    },
    /// Endpoints are equal; nothing runs. `value` is the (possibly snapped)
    /// position to project once.
    Degenerate {
        /// Value to write to the body.
        value: f64,
    },
    /// The sequencer was already running; nothing changed.
    AlreadyActive,
}

/// What happened during one [`LegSequencer::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerStep {
    /// Phase at the start of the tick, `None` if inactive.
    pub before: Option<Phase>,
    /// Phase at the end of the tick, `None` if inactive.
    pub after: Option<Phase>,
    /// Value to project, `None` if inactive.
    pub value: Option<f64>,
    /// Whether a leg finished during this tick.
    pub leg_completed: bool,
}

impl SequencerStep {
    const IDLE: Self = Self {
        before: None,
        after: None,
        value: None,
        leg_completed: false,
    };

    /// Whether the body is in its moving phase at the end of the tick.
    pub fn is_moving(&self) -> bool {
        self.after == Some(Phase::Moving)
    }
}

/// Drives the two-endpoint sweep cycle.
#[derive(Debug, Clone)]
pub struct LegSequencer {
    id: EmitterId,
    config: SweepConfig,
    state: Option<SweepState>,
}

impl LegSequencer {
    /// Create an inactive sequencer.
    pub const fn new(id: EmitterId, config: SweepConfig) -> Self {
        Self {
            id,
            config,
            state: None,
        }
    }

    /// The emitter id stamped on events.
    pub const fn id(&self) -> EmitterId {
        self.id
    }

    /// The immutable configuration.
    pub const fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run-time state, `None` while inactive or degenerate.
    pub const fn state(&self) -> Option<&SweepState> {
        self.state.as_ref()
    }

    /// Whether a cycle is running.
    pub const fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Current phase, `None` while inactive.
    pub fn phase(&self) -> Option<Phase> {
        self.state.map(|s| s.phase)
    }

    /// Start the cycle.
    ///
    /// `current` is the body's present coordinate, used when the
    /// configuration does not snap to the start value.
    pub fn activate(&mut self, current: f64, now: f64, sink: &mut dyn EventSink) -> Activation {
        if self.state.is_some() {
            return Activation::AlreadyActive;
        }

        let value = if self.config.snap_to_start {
            self.config.start_value
        } else {
            current
        };

        if self.config.is_degenerate() {
            debug!(emitter = %self.id, value, "Degenerate sweep, not starting");
            return Activation::Degenerate { value };
        }

        let mut state = SweepState {
            phase: Phase::Paused,
            direction: Direction::Forward,
            elapsed: 0.0,
            current_value: value,
            legs_completed: 0,
        };
        begin_leg(self.id, &self.config, &mut state, now, sink);
        debug!(emitter = %self.id, phase = ?state.phase, value, "Sweep activated");
        self.state = Some(state);
        Activation::Started { value }
    }

    /// Stop the cycle and discard all in-flight timers.
    pub fn deactivate(&mut self) {
        if self.state.take().is_some() {
            debug!(emitter = %self.id, "Sweep deactivated");
        }
    }

    /// Advance the cycle by one frame.
    pub fn tick(&mut self, frame: FrameTime, sink: &mut dyn EventSink) -> SequencerStep {
        let Some(state) = self.state.as_mut() else {
            return SequencerStep::IDLE;
        };
        let before = state.phase;
        state.elapsed += frame.dt();
        let mut leg_completed = false;

        match state.phase {
            Phase::Telegraphing => {
                if state.elapsed >= self.config.telegraph_lead {
                    enter_moving(self.id, state, frame.now(), sink);
                }
            }
            Phase::Moving => {
                let (from, to) = self.config.leg_endpoints(state.direction);
                if state.elapsed >= self.config.leg_duration {
                    state.current_value = to;
                    state.legs_completed = state.legs_completed.saturating_add(1);
                    leg_completed = true;
                    finish_leg(self.id, &self.config, state, frame.now(), sink);
                } else {
                    let k = clock::evaluate(
                        state.elapsed,
                        self.config.leg_duration,
                        self.config.easing.as_ref(),
                    );
                    state.current_value = clock::lerp_unclamped(from, to, k);
                }
            }
            Phase::Paused => {
                if state.elapsed >= self.config.pause_duration {
                    start_next_leg(self.id, &self.config, state, frame.now(), sink);
                }
            }
        }

        if state.phase != before {
            debug!(
                emitter = %self.id,
                from = ?before,
                to = ?state.phase,
                direction = ?state.direction,
                value = state.current_value,
                "Phase transition"
            );
        }

        SequencerStep {
            before: Some(before),
            after: Some(state.phase),
            value: Some(state.current_value),
            leg_completed,
        }
    }
}

/// Emit an event from this sequencer.
fn emit(id: EmitterId, kind: SignalKind, now: f64, sink: &mut dyn EventSink) {
    sink.emit(SweepEvent::new(id, kind, now));
}

/// Start a leg in the state's current direction.
fn begin_leg(
    id: EmitterId,
    config: &SweepConfig,
    state: &mut SweepState,
    now: f64,
    sink: &mut dyn EventSink,
) {
    emit(id, SignalKind::MoveEnd, now, sink);
    if config.telegraph_lead > 0.0 {
        emit(id, SignalKind::Telegraph, now, sink);
        state.phase = Phase::Telegraphing;
        state.elapsed = 0.0;
    } else {
        enter_moving(id, state, now, sink);
    }
}

fn enter_moving(id: EmitterId, state: &mut SweepState, now: f64, sink: &mut dyn EventSink) {
    emit(id, SignalKind::MoveStart, now, sink);
    state.phase = Phase::Moving;
    state.elapsed = 0.0;
}

/// Leave the moving phase: pause, or go straight into the next leg.
fn finish_leg(
    id: EmitterId,
    config: &SweepConfig,
    state: &mut SweepState,
    now: f64,
    sink: &mut dyn EventSink,
) {
    if config.pause_duration > 0.0 {
        state.phase = Phase::Paused;
        state.elapsed = 0.0;
    } else {
        start_next_leg(id, config, state, now, sink);
    }
}

fn start_next_leg(
    id: EmitterId,
    config: &SweepConfig,
    state: &mut SweepState,
    now: f64,
    sink: &mut dyn EventSink,
) {
    state.direction = state.direction.flipped();
    begin_leg(id, config, state, now, sink);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use sweeper_events::RecordingSink;

    use super::*;
    use crate::easing::Easing;

    fn config(leg: f64, pause: f64, lead: f64) -> SweepConfig {
        SweepConfig::new(0.0, 10.0, leg, pause, lead, Easing::Linear.shared())
    }

    fn kinds(sink: &RecordingSink) -> Vec<SignalKind> {
        sink.events().iter().map(|e| e.kind).collect()
    }

    fn frame(dt: f64) -> FrameTime {
        FrameTime::new(dt, 0.0)
    }

    #[test]
    fn activation_emits_move_end_then_telegraph() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(2.0, 0.5, 0.25));
        let mut sink = RecordingSink::new();
        let activation = seq.activate(3.0, 0.0, &mut sink);

        assert_eq!(activation, Activation::Started { value: 0.0 });
        assert_eq!(seq.phase(), Some(Phase::Telegraphing));
        assert_eq!(kinds(&sink), vec![SignalKind::MoveEnd, SignalKind::Telegraph]);
    }

    #[test]
    fn zero_telegraph_goes_straight_to_moving() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(2.0, 0.0, 0.0));
        let mut sink = RecordingSink::new();
        seq.activate(0.0, 0.0, &mut sink);
        assert_eq!(seq.phase(), Some(Phase::Moving));
        assert_eq!(kinds(&sink), vec![SignalKind::MoveEnd, SignalKind::MoveStart]);
    }

    #[test]
    fn full_cycle_visits_every_phase_in_order() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(1.0, 0.5, 0.25));
        let mut sink = RecordingSink::new();
        seq.activate(0.0, 0.0, &mut sink);

        let step = seq.tick(frame(0.25), &mut sink);
        assert_eq!(step.before, Some(Phase::Telegraphing));
        assert_eq!(step.after, Some(Phase::Moving));

        let step = seq.tick(frame(1.0), &mut sink);
        assert!(step.leg_completed);
        assert_eq!(step.after, Some(Phase::Paused));
        assert_eq!(step.value, Some(10.0));

        let step = seq.tick(frame(0.5), &mut sink);
        assert_eq!(step.after, Some(Phase::Telegraphing));
        assert_eq!(seq.state().unwrap().direction(), Direction::Backward);

        assert_eq!(
            kinds(&sink),
            vec![
                SignalKind::MoveEnd,
                SignalKind::Telegraph,
                SignalKind::MoveStart,
                SignalKind::MoveEnd,
                SignalKind::Telegraph,
            ]
        );
    }

    #[test]
    fn not_snapping_keeps_current_value() {
        let cfg = config(1.0, 0.0, 0.5).with_snap_to_start(false);
        let mut seq = LegSequencer::new(EmitterId::new(), cfg);
        let activation = seq.activate(4.0, 0.0, &mut RecordingSink::new());
        assert_eq!(activation, Activation::Started { value: 4.0 });
        assert_eq!(seq.state().unwrap().current_value(), 4.0);
    }

    #[test]
    fn second_activation_is_a_no_op() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(1.0, 0.0, 0.0));
        let mut sink = RecordingSink::new();
        seq.activate(0.0, 0.0, &mut sink);
        assert_eq!(seq.activate(0.0, 0.0, &mut sink), Activation::AlreadyActive);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn deactivate_discards_state() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(1.0, 0.0, 0.0));
        let mut sink = RecordingSink::new();
        seq.activate(0.0, 0.0, &mut sink);
        seq.tick(frame(0.5), &mut sink);
        seq.deactivate();

        assert!(!seq.is_active());
        let before = sink.len();
        let step = seq.tick(frame(10.0), &mut sink);
        assert_eq!(step, SequencerStep::IDLE);
        assert_eq!(sink.len(), before);
    }

    #[test]
    fn leftover_time_is_not_carried_into_next_phase() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(1.0, 0.0, 0.0));
        let mut sink = RecordingSink::new();
        seq.activate(0.0, 0.0, &mut sink);
        let step = seq.tick(frame(1.75), &mut sink);
        assert!(step.leg_completed);
        assert_eq!(step.after, Some(Phase::Moving));
        assert_eq!(step.value, Some(10.0));
        assert_eq!(seq.state().unwrap().elapsed(), 0.0);
        assert_eq!(seq.state().unwrap().direction(), Direction::Backward);
    }

    #[test]
    fn negative_durations_are_clamped() {
        let cfg = config(-1.0, -2.0, -3.0);
        assert_eq!(cfg.leg_duration(), clock::MIN_DURATION);
        assert_eq!(cfg.pause_duration(), 0.0);
        assert_eq!(cfg.telegraph_lead(), 0.0);
    }

    #[test]
    fn legs_completed_counts_up() {
        let mut seq = LegSequencer::new(EmitterId::new(), config(0.5, 0.0, 0.0));
        let mut sink = RecordingSink::new();
        seq.activate(0.0, 0.0, &mut sink);
        for _ in 0..4 {
            seq.tick(frame(0.5), &mut sink);
        }
        assert_eq!(seq.state().unwrap().legs_completed(), 4);
    }
}
