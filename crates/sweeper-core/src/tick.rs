//! Tick cycle: one deterministic frame of a Sweeper scene.
//!
//! Each tick runs through these phases:
//!
//! 1. **Reload** -- advance the pending reload timers of hazards and goals.
//!    If one fires, the reset handler is invoked and the tick ends at once;
//!    the caller is expected to rebuild the scene.
//!
//! 2. **Sweep** -- step every sequencer, project its value onto the body,
//!    and synchronise the hazard's lethal window with the new phase.
//!
//! 3. **Mechanisms** -- advance plate visuals and pending door closes, apply
//!    the resulting door commands, then advance door panels.
//!
//! 4. **Contacts** -- evaluate the contacts reported for this frame against
//!    their targets, in order.
//!
//! State transitions therefore always happen before the position write, and
//! the position write before contact evaluation.

use std::collections::BTreeMap;

use sweeper_events::EventSink;
use sweeper_types::{ContactEvent, EmitterId, Phase, ReloadReason, SignalKind, SweepEvent};
use tracing::{debug, info, warn};

use crate::clock::FrameTime;
use crate::config::SceneConfig;
use crate::door::SlidingDoor;
use crate::goal::GoalTrigger;
use crate::plate::{DoorCommand, PressurePlate};
use crate::projector::Transform;
use crate::reload::ResetHandler;
use crate::sweeper::{ActivationError, SweepHazard, SweepHazardBuilder};

/// Errors raised while assembling a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    /// Two scene objects share a name.
    #[error("duplicate scene object name `{name}`")]
    DuplicateName {
        /// The repeated name.
        name: String,
    },

    /// A plate refers to a door that does not exist.
    #[error("plate `{plate}` refers to unknown door `{door}`")]
    UnknownDoor {
        /// The plate holding the link.
        plate: String,
        /// The missing door name.
        door: String,
    },

    /// A component could not be built.
    #[error("activation error: {source}")]
    Activation {
        /// The underlying activation error.
        #[from]
        source: ActivationError,
    },
}

/// Kind and index of a named scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneObject {
    /// A sweeper or hazard.
    Sweeper(usize),
    /// A goal volume.
    Goal(usize),
    /// A pressure plate.
    Plate(usize),
    /// A sliding door.
    Door(usize),
}

/// A contact addressed to a named scene object.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetedContact {
    /// Name of the object touched.
    pub target: String,
    /// The contact itself.
    pub event: ContactEvent,
}

#[derive(Debug)]
struct PlateSlot {
    plate: PressurePlate<Transform>,
    door: Option<usize>,
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed (1-based since the scene loaded).
    pub tick: u64,
    /// Scene time at the end of the tick, in seconds.
    pub time: f64,
    /// Sweepers in their moving phase at the end of the tick.
    pub moving: usize,
    /// Legs completed during the tick.
    pub legs_completed: u32,
    /// Kills decided during the tick.
    pub kills: u32,
    /// Goals reached during the tick.
    pub goals_reached: u32,
    /// Door commands applied during the tick.
    pub door_commands: u32,
    /// Contacts that named no scene object.
    pub unknown_targets: u32,
    /// Set when a reload fired; the scene should be rebuilt.
    pub reload: Option<ReloadReason>,
}

/// The mutable scene state passed through the tick cycle.
#[derive(Debug)]
pub struct SceneState {
    tick: u64,
    time: f64,
    sweepers: Vec<SweepHazard<Transform>>,
    goals: Vec<GoalTrigger>,
    plates: Vec<PlateSlot>,
    doors: Vec<SlidingDoor<Transform>>,
    names: BTreeMap<String, SceneObject>,
}

impl SceneState {
    /// Assemble an inactive scene from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError`] for duplicate names, plates linked to unknown
    /// doors, or components that cannot be built.
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        let mut names = BTreeMap::new();

        let mut doors = Vec::with_capacity(config.doors.len());
        for (index, settings) in config.doors.iter().enumerate() {
            register(&mut names, &settings.name, SceneObject::Door(index))?;
            doors.push(SlidingDoor::new(
                settings.name.clone(),
                Transform::at(settings.position),
                settings.open_offset,
                settings.move_time,
                settings.easing.clone().shared(),
                settings.start_closed,
            ));
        }

        let mut sweepers = Vec::with_capacity(config.sweepers.len());
        for (index, settings) in config.sweepers.iter().enumerate() {
            register(&mut names, &settings.name, SceneObject::Sweeper(index))?;
            let hazard = SweepHazardBuilder::new(settings.name.clone())
                .config(settings.sweep_config())
                .axis(settings.axis)
                .filter(settings.filter())
                .kill_on_contact(settings.kill_on_contact)
                .kill_only_while_moving(settings.kill_only_while_moving)
                .reload(settings.reload_policy())
                .body(Transform::at(settings.position))
                .build()?;
            sweepers.push(hazard);
        }

        let mut goals = Vec::with_capacity(config.goals.len());
        for (index, settings) in config.goals.iter().enumerate() {
            register(&mut names, &settings.name, SceneObject::Goal(index))?;
            goals.push(GoalTrigger::new(
                settings.name.clone(),
                settings.tag.clone(),
                settings.reload_policy(),
            ));
        }

        let mut plates = Vec::with_capacity(config.plates.len());
        for (index, settings) in config.plates.iter().enumerate() {
            register(&mut names, &settings.name, SceneObject::Plate(index))?;
            let door = match settings.door.as_deref() {
                None => None,
                Some(door) => match names.get(door) {
                    Some(SceneObject::Door(door_index)) => Some(*door_index),
                    _ => {
                        return Err(SceneError::UnknownDoor {
                            plate: settings.name.clone(),
                            door: door.to_owned(),
                        });
                    }
                },
            };
            plates.push(PlateSlot {
                plate: PressurePlate::new(
                    settings.name.clone(),
                    Transform::at(settings.position),
                    settings.plate_config(),
                ),
                door,
            });
        }

        info!(
            sweepers = sweepers.len(),
            goals = goals.len(),
            plates = plates.len(),
            doors = doors.len(),
            "Scene assembled"
        );

        Ok(Self {
            tick: 0,
            time: 0.0,
            sweepers,
            goals,
            plates,
            doors,
            names,
        })
    }

    /// Activate every sweeper at the current scene time.
    pub fn activate(&mut self, sink: &mut dyn EventSink) {
        for sweeper in &mut self.sweepers {
            sweeper.activate(self.time, sink);
        }
    }

    /// Deactivate every sweeper; pending reloads are cancelled.
    pub fn deactivate(&mut self) {
        for sweeper in &mut self.sweepers {
            sweeper.deactivate();
        }
    }

    /// Ticks executed since the scene loaded.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Scene time in seconds since the scene loaded.
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Look up a named object.
    pub fn object(&self, name: &str) -> Option<SceneObject> {
        self.names.get(name).copied()
    }

    /// A sweeper by name.
    pub fn sweeper(&self, name: &str) -> Option<&SweepHazard<Transform>> {
        match self.object(name)? {
            SceneObject::Sweeper(index) => self.sweepers.get(index),
            _ => None,
        }
    }

    /// A goal by name.
    pub fn goal(&self, name: &str) -> Option<&GoalTrigger> {
        match self.object(name)? {
            SceneObject::Goal(index) => self.goals.get(index),
            _ => None,
        }
    }

    /// A plate by name.
    pub fn plate(&self, name: &str) -> Option<&PressurePlate<Transform>> {
        match self.object(name)? {
            SceneObject::Plate(index) => self.plates.get(index).map(|slot| &slot.plate),
            _ => None,
        }
    }

    /// A door by name.
    pub fn door(&self, name: &str) -> Option<&SlidingDoor<Transform>> {
        match self.object(name)? {
            SceneObject::Door(index) => self.doors.get(index),
            _ => None,
        }
    }

    /// All sweepers, in configuration order.
    pub fn sweepers(&self) -> &[SweepHazard<Transform>] {
        &self.sweepers
    }
}

fn register(
    names: &mut BTreeMap<String, SceneObject>,
    name: &str,
    object: SceneObject,
) -> Result<(), SceneError> {
    if names.insert(name.to_owned(), object).is_some() {
        return Err(SceneError::DuplicateName {
            name: name.to_owned(),
        });
    }
    Ok(())
}

fn apply_door_command(
    door: Option<&mut SlidingDoor<Transform>>,
    command: DoorCommand,
    now: f64,
    sink: &mut dyn EventSink,
) -> bool {
    let Some(door) = door else {
        return false;
    };
    match command {
        DoorCommand::Open => door.open(now, sink),
        DoorCommand::Close => door.close(now, sink),
    }
    true
}

fn request_reload(id: EmitterId, reason: ReloadReason, now: f64, sink: &mut dyn EventSink) {
    sink.emit(SweepEvent::new(id, SignalKind::ReloadRequested, now));
    info!(?reason, "Scene reload requested");
}

/// Execute one tick of `dt` seconds.
///
/// `contacts` are the trigger contacts observed during this frame. The
/// returned summary reports what happened; when [`TickSummary::reload`] is
/// set the reset handler has already been invoked and the scene should be
/// replaced.
pub fn run_tick(
    state: &mut SceneState,
    dt: f64,
    contacts: &[TargetedContact],
    sink: &mut dyn EventSink,
    reset: &mut dyn ResetHandler,
) -> TickSummary {
    let frame = FrameTime::new(dt, state.time + dt.max(0.0));
    state.tick = state.tick.saturating_add(1);
    state.time = frame.now();
    let now = frame.now();

    let mut summary = TickSummary {
        tick: state.tick,
        time: now,
        ..TickSummary::default()
    };

    // --- Phase 1: Reload ---
    for sweeper in &mut state.sweepers {
        if let Some(reason) = sweeper.tick_reload(frame.dt(), reset) {
            request_reload(sweeper.id(), reason, now, sink);
            summary.reload = Some(reason);
            return summary;
        }
    }
    for goal in &mut state.goals {
        if let Some(reason) = goal.tick_reload(frame.dt(), reset) {
            request_reload(goal.id(), reason, now, sink);
            summary.reload = Some(reason);
            return summary;
        }
    }

    // --- Phase 2: Sweep ---
    for sweeper in &mut state.sweepers {
        let step = sweeper.advance(frame, sink);
        if step.leg_completed {
            summary.legs_completed = summary.legs_completed.saturating_add(1);
        }
        if step.after == Some(Phase::Moving) {
            summary.moving = summary.moving.saturating_add(1);
        }
    }

    // --- Phase 3: Mechanisms ---
    for slot in &mut state.plates {
        if let Some(command) = slot.plate.tick(frame.dt()) {
            let door = slot.door.and_then(|index| state.doors.get_mut(index));
            if apply_door_command(door, command, now, sink) {
                summary.door_commands = summary.door_commands.saturating_add(1);
            }
        }
    }
    for door in &mut state.doors {
        door.tick(frame.dt());
    }

    // --- Phase 4: Contacts ---
    for contact in contacts {
        let Some(object) = state.names.get(&contact.target).copied() else {
            warn!(target_name = %contact.target, "Contact for unknown scene object ignored");
            summary.unknown_targets = summary.unknown_targets.saturating_add(1);
            continue;
        };
        match object {
            SceneObject::Sweeper(index) => {
                let killed = state
                    .sweepers
                    .get_mut(index)
                    .is_some_and(|sweeper| sweeper.on_contact(&contact.event, now, sink).is_kill());
                if killed {
                    summary.kills = summary.kills.saturating_add(1);
                }
            }
            SceneObject::Goal(index) => {
                let reached = state
                    .goals
                    .get_mut(index)
                    .is_some_and(|goal| goal.on_contact(&contact.event, now, sink));
                if reached {
                    summary.goals_reached = summary.goals_reached.saturating_add(1);
                }
            }
            SceneObject::Plate(index) => {
                let Some(slot) = state.plates.get_mut(index) else {
                    continue;
                };
                if let Some(command) = slot.plate.on_contact(&contact.event, now, sink) {
                    let door = slot.door.and_then(|i| state.doors.get_mut(i));
                    if apply_door_command(door, command, now, sink) {
                        summary.door_commands = summary.door_commands.saturating_add(1);
                    }
                }
            }
            SceneObject::Door(_) => {
                debug!(target_name = %contact.target, "Doors ignore contacts");
            }
        }
    }

    summary
}
