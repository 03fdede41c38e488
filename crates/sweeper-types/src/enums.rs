//! Enumeration types shared across the Sweeper workspace.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// Phase of a leg in the sweep cycle.
///
/// A running sequencer cycles `Telegraphing -> Moving -> Paused` forever,
/// skipping any phase whose configured duration is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Warning delay before the body starts moving.
    Telegraphing,
    /// The body is interpolating between endpoints.
    Moving,
    /// The body rests at an endpoint.
    Paused,
}

/// Direction of travel for the current leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// From the start value towards the end value.
    Forward,
    /// From the end value back towards the start value.
    Backward,
}

impl Direction {
    /// Return the opposite direction.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// A single coordinate axis of a body position.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Horizontal X coordinate.
    X,
    /// Vertical Y coordinate (the sweep axis in the prototype scenes).
    #[default]
    Y,
    /// Depth Z coordinate.
    Z,
}

// ---------------------------------------------------------------------------
// Contacts and decisions
// ---------------------------------------------------------------------------

/// Whether an activator entered or left a trigger volume.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    /// The activator started overlapping the volume.
    #[default]
    Enter,
    /// The activator stopped overlapping the volume.
    Exit,
}

/// Outcome of evaluating a contact against a hazard gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillDecision {
    /// The contact is not lethal (filtered, outside the window, or latched).
    NoAction,
    /// The contact is lethal. Produced at most once per activation.
    Kill,
}

impl KillDecision {
    /// Return `true` for [`KillDecision::Kill`].
    pub const fn is_kill(self) -> bool {
        matches!(self, Self::Kill)
    }
}

/// Why a scene reload was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReloadReason {
    /// An activator was killed by a hazard.
    Killed,
    /// An activator reached a goal.
    GoalReached,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Kind of notification emitted to an event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// A leg is about to start; emitted once per leg when telegraphing.
    Telegraph,
    /// The body started moving.
    MoveStart,
    /// The previous leg ended. Emitted when the next leg begins, so the
    /// first one arrives before any motion.
    MoveEnd,
    /// A hazard killed an activator.
    Kill,
    /// An activator reached a goal.
    GoalReached,
    /// A pressure plate went down.
    Pressed,
    /// A pressure plate came back up.
    Released,
    /// A door was commanded open.
    DoorOpened,
    /// A door was commanded closed.
    DoorClosed,
    /// A delayed scene reload fired.
    ReloadRequested,
}
