//! Goal trigger: completes the level the first time an accepted activator
//! enters, then requests a reload.

use sweeper_events::EventSink;
use sweeper_types::{ContactEvent, ContactKind, EmitterId, ReloadReason, SignalKind, SweepEvent};
use tracing::info;

use crate::reload::{ReloadPolicy, ReloadTrigger, ResetHandler};

/// A latched goal volume.
#[derive(Debug, Clone)]
pub struct GoalTrigger {
    id: EmitterId,
    name: String,
    tag: String,
    policy: ReloadPolicy,
    triggered: bool,
    reload: ReloadTrigger,
}

impl GoalTrigger {
    /// A goal that completes for activators tagged `tag`.
    ///
    /// An empty `tag` accepts every activator.
    pub fn new(name: impl Into<String>, tag: impl Into<String>, policy: ReloadPolicy) -> Self {
        Self {
            id: EmitterId::new(),
            name: name.into(),
            tag: tag.into(),
            policy,
            triggered: false,
            reload: ReloadTrigger::new(),
        }
    }

    /// Emitter id stamped on this goal's events.
    pub const fn id(&self) -> EmitterId {
        self.id
    }

    /// Configured name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the goal has already been reached.
    pub const fn is_triggered(&self) -> bool {
        self.triggered
    }

    /// Whether a reload is waiting to fire.
    pub const fn reload_pending(&self) -> bool {
        self.reload.is_pending()
    }

    /// Evaluate a contact. Returns `true` when this contact reached the goal.
    pub fn on_contact(&mut self, event: &ContactEvent, now: f64, sink: &mut dyn EventSink) -> bool {
        if self.triggered || event.kind != ContactKind::Enter {
            return false;
        }
        if !self.tag.is_empty() && event.activator.tag != self.tag {
            return false;
        }

        self.triggered = true;
        let delay = self.policy.effective_delay();
        info!(name = %self.name, tag = %event.activator.tag, delay, "Goal reached");
        sink.emit(SweepEvent::new(self.id, SignalKind::GoalReached, now));
        self.reload.schedule(delay, ReloadReason::GoalReached);
        true
    }

    /// Advance the reload timer; fires `handler` once when due.
    pub fn tick_reload(&mut self, dt: f64, handler: &mut dyn ResetHandler) -> Option<ReloadReason> {
        self.reload.tick(dt, handler)
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use sweeper_events::RecordingSink;
    use sweeper_types::Activator;

    use super::*;
    use crate::reload::RecordingReset;

    fn goal(tag: &str) -> GoalTrigger {
        GoalTrigger::new(
            "beacon",
            tag,
            ReloadPolicy {
                reload_delay: 0.35,
                blink_duration: Some(0.6),
            },
        )
    }

    #[test]
    fn fires_once_for_matching_tag() {
        let mut g = goal("Player");
        let mut sink = RecordingSink::new();
        let player = ContactEvent::enter(Activator::new("Player", 0), 0.0);

        assert!(g.on_contact(&player, 1.0, &mut sink));
        assert!(!g.on_contact(&player, 1.5, &mut sink));
        assert_eq!(sink.len(), 1);
        assert_eq!(sink.events()[0].kind, SignalKind::GoalReached);
        assert!(g.reload_pending());
    }

    #[test]
    fn ignores_other_tags_and_exits() {
        let mut g = goal("Player");
        let mut sink = RecordingSink::new();
        let crate_contact = ContactEvent::enter(Activator::new("Crate", 0), 0.0);
        let exit = ContactEvent::exit(Activator::new("Player", 0), 0.0);

        assert!(!g.on_contact(&crate_contact, 0.0, &mut sink));
        assert!(!g.on_contact(&exit, 0.0, &mut sink));
        assert!(!g.is_triggered());
        assert!(sink.is_empty());
    }

    #[test]
    fn empty_tag_accepts_anyone() {
        let mut g = goal("");
        let mut sink = RecordingSink::new();
        let crate_contact = ContactEvent::enter(Activator::new("Crate", 4), 0.0);
        assert!(g.on_contact(&crate_contact, 0.0, &mut sink));
    }

    #[test]
    fn reload_waits_for_blink() {
        let mut g = goal("Player");
        let mut sink = RecordingSink::new();
        let mut reset = RecordingReset::default();
        g.on_contact(&ContactEvent::enter(Activator::new("Player", 0), 0.0), 0.0, &mut sink);

        assert_eq!(g.tick_reload(0.5, &mut reset), None);
        assert_eq!(g.tick_reload(0.25, &mut reset), Some(ReloadReason::GoalReached));
        assert_eq!(reset.calls, vec![ReloadReason::GoalReached]);
    }
}
