//! Sweep hazard: one body driven by a leg sequencer and guarded by a gate.
//!
//! [`SweepHazard`] composes the parts of a sweeping hazard and owns all of
//! their state exclusively:
//!
//! - a [`LegSequencer`] producing the swept value,
//! - a [`MotionProjector`] writing it to the owned [`Body`],
//! - a [`HazardGate`] whose lethal window follows the `Moving` phase,
//! - a [`ReloadTrigger`] scheduled once on the first kill.
//!
//! A plain (harmless) sweeper is the same component with
//! `kill_on_contact` disabled.

use sweeper_events::EventSink;
use sweeper_types::{
    Axis, ContactEvent, EmitterId, KillDecision, Phase, ReloadReason, SignalKind, SweepEvent,
};
use tracing::{debug, info};

use crate::clock::FrameTime;
use crate::hazard::{HazardFilter, HazardGate, HazardState};
use crate::projector::{Body, MotionProjector};
use crate::reload::{ReloadPolicy, ReloadTrigger, ResetHandler};
use crate::sequencer::{Activation, LegSequencer, SequencerStep, SweepConfig};

/// Errors raised when a component is assembled without a required
/// collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ActivationError {
    /// No body was supplied to move.
    #[error("{component} `{name}` has no body to move")]
    MissingBody {
        /// Kind of component being built.
        component: &'static str,
        /// Name of the component.
        name: String,
    },

    /// No sweep configuration was supplied.
    #[error("{component} `{name}` has no sweep configuration")]
    MissingConfig {
        /// Kind of component being built.
        component: &'static str,
        /// Name of the component.
        name: String,
    },
}

/// Builder for [`SweepHazard`].
#[derive(Debug)]
pub struct SweepHazardBuilder<B> {
    name: String,
    id: EmitterId,
    config: Option<SweepConfig>,
    axis: Axis,
    filter: HazardFilter,
    kill_on_contact: bool,
    kill_only_while_moving: bool,
    reload: ReloadPolicy,
    body: Option<B>,
}

impl<B: Body> SweepHazardBuilder<B> {
    /// Start building a hazard called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: EmitterId::new(),
            config: None,
            axis: Axis::Y,
            filter: HazardFilter::default(),
            kill_on_contact: true,
            kill_only_while_moving: true,
            reload: ReloadPolicy::default(),
            body: None,
        }
    }

    /// Use a specific emitter id.
    #[must_use]
    pub const fn id(mut self, id: EmitterId) -> Self {
        self.id = id;
        self
    }

    /// The sweep configuration (required).
    #[must_use]
    pub fn config(mut self, config: SweepConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// The axis to sweep along (default Y).
    #[must_use]
    pub const fn axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// The activator filter (default: tag `Player`, all layers).
    #[must_use]
    pub fn filter(mut self, filter: HazardFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether contacts can kill at all (default `true`).
    #[must_use]
    pub const fn kill_on_contact(mut self, enabled: bool) -> Self {
        self.kill_on_contact = enabled;
        self
    }

    /// Whether contacts only kill during the moving phase (default `true`).
    #[must_use]
    pub const fn kill_only_while_moving(mut self, enabled: bool) -> Self {
        self.kill_only_while_moving = enabled;
        self
    }

    /// Reload delay policy after a kill.
    #[must_use]
    pub const fn reload(mut self, policy: ReloadPolicy) -> Self {
        self.reload = policy;
        self
    }

    /// The body to move (required).
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Assemble the hazard.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError`] if the body or the configuration is
    /// missing.
    pub fn build(self) -> Result<SweepHazard<B>, ActivationError> {
        let Some(body) = self.body else {
            return Err(ActivationError::MissingBody {
                component: "sweeper",
                name: self.name,
            });
        };
        let Some(config) = self.config else {
            return Err(ActivationError::MissingConfig {
                component: "sweeper",
                name: self.name,
            });
        };
        Ok(SweepHazard {
            name: self.name,
            sequencer: LegSequencer::new(self.id, config),
            projector: MotionProjector::new(self.axis),
            gate: HazardGate::new(self.filter, self.kill_on_contact, self.kill_only_while_moving),
            reload_policy: self.reload,
            reload: ReloadTrigger::new(),
            body,
        })
    }
}

/// A swept body with an optional lethal contact window.
#[derive(Debug)]
pub struct SweepHazard<B> {
    name: String,
    sequencer: LegSequencer,
    projector: MotionProjector,
    gate: HazardGate,
    reload_policy: ReloadPolicy,
    reload: ReloadTrigger,
    body: B,
}

impl<B: Body> SweepHazard<B> {
    /// Emitter id stamped on this hazard's events.
    pub const fn id(&self) -> EmitterId {
        self.sequencer.id()
    }

    /// Configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owned body.
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// The sequencer driving the body.
    pub const fn sequencer(&self) -> &LegSequencer {
        &self.sequencer
    }

    /// Current phase, `None` while inactive or degenerate.
    pub fn phase(&self) -> Option<Phase> {
        self.sequencer.phase()
    }

    /// Current gate state.
    pub const fn hazard_state(&self) -> HazardState {
        self.gate.state()
    }

    /// Whether a reload is waiting to fire.
    pub const fn reload_pending(&self) -> bool {
        self.reload.is_pending()
    }

    /// Start the sweep cycle and arm the gate.
    pub fn activate(&mut self, now: f64, sink: &mut dyn EventSink) {
        let current = self.body.position().get(self.projector.axis());
        match self.sequencer.activate(current, now, sink) {
            Activation::Started { value } | Activation::Degenerate { value } => {
                self.projector.apply(&mut self.body, value);
            }
            Activation::AlreadyActive => return,
        }
        self.gate.activate();
        self.gate
            .set_moving(self.sequencer.phase() == Some(Phase::Moving));
        info!(name = %self.name, id = %self.id(), phase = ?self.phase(), "Sweeper activated");
    }

    /// Stop the cycle, disarm the gate, and cancel any pending reload.
    pub fn deactivate(&mut self) {
        self.sequencer.deactivate();
        self.gate.deactivate();
        if self.reload.cancel() {
            debug!(name = %self.name, "Pending reload cancelled by deactivation");
        }
    }

    /// Advance the sequencer, project the value, and sync the lethal window.
    pub fn advance(&mut self, frame: FrameTime, sink: &mut dyn EventSink) -> SequencerStep {
        let step = self.sequencer.tick(frame, sink);
        if let Some(value) = step.value {
            self.projector.apply(&mut self.body, value);
        }
        if step.after.is_some() {
            self.gate.set_moving(step.is_moving());
        }
        step
    }

    /// Evaluate a contact; on the first kill emit it and schedule a reload.
    pub fn on_contact(
        &mut self,
        event: &ContactEvent,
        now: f64,
        sink: &mut dyn EventSink,
    ) -> KillDecision {
        let decision = self.gate.on_contact(event);
        if decision.is_kill() {
            let delay = self.reload_policy.effective_delay();
            info!(
                name = %self.name,
                tag = %event.activator.tag,
                activator = %event.activator.id,
                delay,
                "Hazard kill"
            );
            sink.emit(SweepEvent::new(self.id(), SignalKind::Kill, now));
            self.reload.schedule(delay, ReloadReason::Killed);
        }
        decision
    }

    /// Advance the reload timer; fires `handler` once when due.
    pub fn tick_reload(&mut self, dt: f64, handler: &mut dyn ResetHandler) -> Option<ReloadReason> {
        self.reload.tick(dt, handler)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use sweeper_events::RecordingSink;
    use sweeper_types::{Activator, Vec3};

    use super::*;
    use crate::easing::Easing;
    use crate::projector::Transform;
    use crate::reload::RecordingReset;

    fn hazard(leg: f64, pause: f64, lead: f64) -> SweepHazard<Transform> {
        SweepHazardBuilder::new("crusher")
            .config(SweepConfig::new(0.0, 10.0, leg, pause, lead, Easing::Linear.shared()))
            .body(Transform::at(Vec3::new(5.0, 3.0, -2.0)))
            .reload(ReloadPolicy {
                reload_delay: 0.35,
                blink_duration: Some(0.6),
            })
            .build()
            .unwrap()
    }

    fn player() -> ContactEvent {
        ContactEvent::enter(Activator::new("Player", 0), 0.0)
    }

    #[test]
    fn missing_body_fails_fast() {
        let result = SweepHazardBuilder::<Transform>::new("ghost")
            .config(SweepConfig::new(0.0, 1.0, 1.0, 0.0, 0.0, Easing::Linear.shared()))
            .build();
        assert!(matches!(result, Err(ActivationError::MissingBody { .. })));
    }

    #[test]
    fn missing_config_fails_fast() {
        let result = SweepHazardBuilder::new("blank").body(Transform::default()).build();
        assert!(matches!(result, Err(ActivationError::MissingConfig { .. })));
    }

    #[test]
    fn activation_snaps_only_the_swept_axis() {
        let mut h = hazard(2.0, 0.0, 0.0);
        h.activate(0.0, &mut RecordingSink::new());
        assert_eq!(h.body().position, Vec3::new(5.0, 0.0, -2.0));
    }

    #[test]
    fn body_follows_sequencer() {
        let mut h = hazard(2.0, 0.0, 0.0);
        let mut sink = RecordingSink::new();
        h.activate(0.0, &mut sink);
        h.advance(FrameTime::new(1.0, 1.0), &mut sink);
        assert_eq!(h.body().position.y, 5.0);
        assert_eq!(h.body().position.x, 5.0);
    }

    #[test]
    fn kill_emits_event_and_schedules_reload() {
        let mut h = hazard(2.0, 0.0, 0.0);
        let mut sink = RecordingSink::new();
        let mut reset = RecordingReset::default();
        h.activate(0.0, &mut sink);
        h.advance(FrameTime::new(0.5, 0.5), &mut sink);

        assert_eq!(h.on_contact(&player(), 0.5, &mut sink), KillDecision::Kill);
        assert_eq!(h.on_contact(&player(), 0.5, &mut sink), KillDecision::NoAction);
        let kills = sink
            .events()
            .iter()
            .filter(|e| e.kind == SignalKind::Kill)
            .count();
        assert_eq!(kills, 1);
        assert!(h.reload_pending());

        assert_eq!(h.tick_reload(0.5, &mut reset), None);
        assert_eq!(h.tick_reload(0.1, &mut reset), Some(ReloadReason::Killed));
        assert_eq!(reset.calls, vec![ReloadReason::Killed]);
    }

    #[test]
    fn telegraph_phase_is_not_lethal() {
        let mut h = hazard(2.0, 0.0, 0.5);
        let mut sink = RecordingSink::new();
        h.activate(0.0, &mut sink);
        assert_eq!(h.phase(), Some(Phase::Telegraphing));
        assert_eq!(h.on_contact(&player(), 0.0, &mut sink), KillDecision::NoAction);

        h.advance(FrameTime::new(0.5, 0.5), &mut sink);
        assert_eq!(h.phase(), Some(Phase::Moving));
        assert_eq!(h.on_contact(&player(), 0.5, &mut sink), KillDecision::Kill);
    }

    #[test]
    fn deactivation_cancels_reload_and_ignores_contacts() {
        let mut h = hazard(2.0, 0.0, 0.0);
        let mut sink = RecordingSink::new();
        let mut reset = RecordingReset::default();
        h.activate(0.0, &mut sink);
        assert!(h.on_contact(&player(), 0.0, &mut sink).is_kill());
        h.deactivate();

        assert!(!h.reload_pending());
        assert_eq!(h.tick_reload(10.0, &mut reset), None);
        assert_eq!(h.on_contact(&player(), 1.0, &mut sink), KillDecision::NoAction);
        assert!(reset.calls.is_empty());
    }

    #[test]
    fn harmless_sweeper_never_kills() {
        let mut h = SweepHazardBuilder::new("lift")
            .config(SweepConfig::new(0.0, 4.0, 1.0, 0.0, 0.0, Easing::EaseInOut.shared()))
            .kill_on_contact(false)
            .body(Transform::default())
            .build()
            .unwrap();
        let mut sink = RecordingSink::new();
        h.activate(0.0, &mut sink);
        assert_eq!(h.on_contact(&player(), 0.0, &mut sink), KillDecision::NoAction);
    }
}
