//! Easing clock, leg sequencer, hazard gate, triggers, and tick cycle for
//! the Sweeper core.
//!
//! This crate is engine-agnostic: nothing here reads a wall clock or owns a
//! renderer. Hosts step it with an explicit frame delta, report contacts,
//! and receive events through an [`EventSink`].
//!
//! # Modules
//!
//! - [`easing`] -- Easing curves, including keyframed Hermite curves.
//! - [`clock`] -- Duration clamping, normalized progress, tweens, countdowns.
//! - [`sequencer`] -- The telegraph / move / pause leg cycle.
//! - [`projector`] -- Writes a swept value onto one axis of a [`Body`].
//! - [`hazard`] -- Activator filters and the lethal-contact gate.
//! - [`reload`] -- Delayed, cancellable reset requests.
//! - [`sweeper`] -- The sweep hazard composite and its builder.
//! - [`goal`] -- Latched goal volumes.
//! - [`plate`] -- Pressure plates driving doors.
//! - [`door`] -- Sliding doors.
//! - [`pusher`] -- Horizontal push velocity for dynamic bodies.
//! - [`pacing`] -- Target frame rate and frame delta.
//! - [`config`] -- Configuration loading from `sweeper-config.yaml`.
//! - [`tick`] -- Scene assembly and the per-frame tick cycle.
//! - [`operator`] -- Pause, resume, stop, and run bounds.
//! - [`runner`] -- The paced async run loop.
//!
//! [`EventSink`]: sweeper_events::EventSink
//! [`Body`]: projector::Body

pub mod clock;
pub mod config;
pub mod door;
pub mod easing;
pub mod goal;
pub mod hazard;
pub mod operator;
pub mod pacing;
pub mod plate;
pub mod projector;
pub mod pusher;
pub mod reload;
pub mod runner;
pub mod sequencer;
pub mod sweeper;
pub mod tick;
