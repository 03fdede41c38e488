//! Shared type definitions for the Sweeper motion and hazard core.
//!
//! This crate is the single source of truth for the value types exchanged
//! between the core, the event sinks, and the engine binary.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for emitters and activators
//! - [`enums`] -- Phases, directions, axes, contact kinds, decisions, signals
//! - [`structs`] -- Vectors, activators, contact events, sweep events

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Axis, ContactKind, Direction, KillDecision, Phase, ReloadReason, SignalKind};
pub use ids::{ActivatorId, EmitterId};
pub use structs::{Activator, ContactEvent, SweepEvent, Vec3};
