//! Hazard gate: decides whether a contact with a moving body is lethal.
//!
//! A contact is evaluated in a fixed order:
//!
//! 1. inactive gate, disabled hazard, or `Exit` contact -- no action;
//! 2. latch already set -- no action (at most one kill per lifecycle);
//! 3. activator rejected by the [`HazardFilter`] -- no action;
//! 4. `kill_only_while_moving` set and the lethal window closed -- no action;
//! 5. otherwise the latch is set and the decision is [`KillDecision::Kill`].
//!
//! The lethal window mirrors the sequencer's `Moving` phase and must be
//! updated after every sequencer step, before contacts for that frame are
//! evaluated.

use serde::{Deserialize, Serialize};
use sweeper_types::{Activator, ContactEvent, ContactKind, KillDecision};
use tracing::debug;

/// Bit mask over the 32 physics layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);

    /// No layer.
    pub const NONE: Self = Self(0);

    /// A mask containing only `layer`. Layers above 31 yield an empty mask.
    pub fn single(layer: u8) -> Self {
        Self(1_u32.checked_shl(u32::from(layer)).unwrap_or(0))
    }

    /// Whether `layer` is in the mask. Layers above 31 never are.
    pub fn contains(self, layer: u8) -> bool {
        1_u32
            .checked_shl(u32::from(layer))
            .is_some_and(|bit| self.0 & bit != 0)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Predicate deciding which activators a trigger reacts to.
///
/// An activator passes when its layer is in `layers` and either its tag is
/// one of `tags` or `tags` is empty and `accept_any_when_empty` is set.
/// Blank entries in `tags` never match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardFilter {
    /// Layers that may trigger.
    #[serde(default)]
    pub layers: LayerMask,
    /// Accepted tags (any-of).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Accept every tag when `tags` is empty.
    #[serde(default = "default_true")]
    pub accept_any_when_empty: bool,
}

const fn default_true() -> bool {
    true
}

impl HazardFilter {
    /// A filter accepting a single tag on every layer.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            layers: LayerMask::ALL,
            tags: vec![tag.into()],
            accept_any_when_empty: true,
        }
    }

    /// A filter accepting everything.
    pub fn any() -> Self {
        Self {
            layers: LayerMask::ALL,
            tags: Vec::new(),
            accept_any_when_empty: true,
        }
    }

    /// Restrict to `layers`.
    #[must_use]
    pub fn on_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    /// Whether `activator` passes the filter.
    pub fn accepts(&self, activator: &Activator) -> bool {
        if !self.layers.contains(activator.layer) {
            return false;
        }
        if self.tags.is_empty() {
            return self.accept_any_when_empty;
        }
        self.tags
            .iter()
            .any(|tag| !tag.is_empty() && *tag == activator.tag)
    }
}

impl Default for HazardFilter {
    fn default() -> Self {
        Self::tag("Player")
    }
}

/// Mutable state of one hazard gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HazardState {
    /// Whether a contact now would be lethal.
    pub lethal_window_open: bool,
    /// Latch set by the first kill.
    pub has_fired: bool,
}

/// Evaluates contacts against the hazard's filter, window, and latch.
#[derive(Debug, Clone)]
pub struct HazardGate {
    filter: HazardFilter,
    kill_on_contact: bool,
    kill_only_while_moving: bool,
    active: bool,
    state: HazardState,
}

impl HazardGate {
    /// Create an inactive gate.
    pub fn new(filter: HazardFilter, kill_on_contact: bool, kill_only_while_moving: bool) -> Self {
        Self {
            filter,
            kill_on_contact,
            kill_only_while_moving,
            active: false,
            state: HazardState {
                lethal_window_open: !kill_only_while_moving,
                has_fired: false,
            },
        }
    }

    /// Current state.
    pub const fn state(&self) -> HazardState {
        self.state
    }

    /// The activator filter.
    pub const fn filter(&self) -> &HazardFilter {
        &self.filter
    }

    /// Whether contacts are evaluated.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Start evaluating contacts. The latch is preserved.
    pub const fn activate(&mut self) {
        self.active = true;
    }

    /// Stop evaluating contacts; later contacts are ignored.
    pub const fn deactivate(&mut self) {
        self.active = false;
        self.state.lethal_window_open = !self.kill_only_while_moving;
    }

    /// Clear the latch for a new lifecycle (after an external reload).
    pub const fn reset(&mut self) {
        self.state.has_fired = false;
    }

    /// Synchronise the lethal window with the sequencer.
    pub const fn set_moving(&mut self, moving: bool) {
        self.state.lethal_window_open = !self.kill_only_while_moving || moving;
    }

    /// Evaluate one contact.
    pub fn on_contact(&mut self, event: &ContactEvent) -> KillDecision {
        if !self.active || !self.kill_on_contact || event.kind != ContactKind::Enter {
            return KillDecision::NoAction;
        }
        if self.state.has_fired {
            return KillDecision::NoAction;
        }
        if !self.filter.accepts(&event.activator) {
            return KillDecision::NoAction;
        }
        if self.kill_only_while_moving && !self.state.lethal_window_open {
            debug!(tag = %event.activator.tag, "Contact outside lethal window");
            return KillDecision::NoAction;
        }
        self.state.has_fired = true;
        KillDecision::Kill
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_enter() -> ContactEvent {
        ContactEvent::enter(Activator::new("Player", 0), 1.0)
    }

    fn armed_gate(kill_only_while_moving: bool) -> HazardGate {
        let mut gate = HazardGate::new(HazardFilter::tag("Player"), true, kill_only_while_moving);
        gate.activate();
        gate
    }

    #[test]
    fn layer_mask_bounds() {
        assert!(LayerMask::ALL.contains(31));
        assert!(!LayerMask::ALL.contains(32));
        assert!(LayerMask::single(3).contains(3));
        assert!(!LayerMask::single(3).contains(4));
        assert_eq!(LayerMask::single(40), LayerMask::NONE);
    }

    #[test]
    fn filter_matches_any_of_tags() {
        let filter = HazardFilter {
            layers: LayerMask::ALL,
            tags: vec!["Player".to_owned(), "Crate".to_owned()],
            accept_any_when_empty: false,
        };
        assert!(filter.accepts(&Activator::new("Crate", 0)));
        assert!(!filter.accepts(&Activator::new("Enemy", 0)));
    }

    #[test]
    fn filter_empty_tags_obeys_flag() {
        let mut filter = HazardFilter::any();
        assert!(filter.accepts(&Activator::new("Anything", 5)));
        filter.accept_any_when_empty = false;
        assert!(!filter.accepts(&Activator::new("Anything", 5)));
    }

    #[test]
    fn filter_blank_tag_never_matches() {
        let filter = HazardFilter::tag("");
        assert!(!filter.accepts(&Activator::new("", 0)));
    }

    #[test]
    fn filter_rejects_excluded_layer() {
        let filter = HazardFilter::tag("Player").on_layers(LayerMask::single(8));
        assert!(!filter.accepts(&Activator::new("Player", 0)));
        assert!(filter.accepts(&Activator::new("Player", 8)));
    }

    #[test]
    fn kills_once_while_moving() {
        let mut gate = armed_gate(true);
        gate.set_moving(true);
        assert_eq!(gate.on_contact(&player_enter()), KillDecision::Kill);
        assert_eq!(gate.on_contact(&player_enter()), KillDecision::NoAction);
        assert_eq!(gate.on_contact(&player_enter()), KillDecision::NoAction);
        assert!(gate.state().has_fired);
    }

    #[test]
    fn no_kill_outside_window() {
        let mut gate = armed_gate(true);
        gate.set_moving(false);
        assert_eq!(gate.on_contact(&player_enter()), KillDecision::NoAction);
        assert!(!gate.state().has_fired);
    }

    #[test]
    fn window_always_open_without_moving_restriction() {
        let mut gate = armed_gate(false);
        gate.set_moving(false);
        assert!(gate.state().lethal_window_open);
        assert_eq!(gate.on_contact(&player_enter()), KillDecision::Kill);
    }

    #[test]
    fn inactive_or_disabled_gate_ignores_contacts() {
        let mut gate = HazardGate::new(HazardFilter::tag("Player"), true, false);
        assert_eq!(gate.on_contact(&player_enter()), KillDecision::NoAction);

        let mut disabled = HazardGate::new(HazardFilter::tag("Player"), false, false);
        disabled.activate();
        assert_eq!(disabled.on_contact(&player_enter()), KillDecision::NoAction);
    }

    #[test]
    fn exit_contacts_are_never_lethal() {
        let mut gate = armed_gate(false);
        let exit = ContactEvent::exit(Activator::new("Player", 0), 1.0);
        assert_eq!(gate.on_contact(&exit), KillDecision::NoAction);
    }

    #[test]
    fn reset_rearms_the_latch() {
        let mut gate = armed_gate(false);
        assert!(gate.on_contact(&player_enter()).is_kill());
        gate.reset();
        assert!(gate.on_contact(&player_enter()).is_kill());
    }

    #[test]
    fn filtered_contact_does_not_set_latch() {
        let mut gate = armed_gate(false);
        let crate_contact = ContactEvent::enter(Activator::new("Crate", 0), 1.0);
        assert_eq!(gate.on_contact(&crate_contact), KillDecision::NoAction);
        assert!(!gate.state().has_fired);
    }
}
