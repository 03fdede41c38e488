//! Configuration loading and typed config structures for a Sweeper scene.
//!
//! The canonical configuration lives in `sweeper-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure and a
//! loader that reads the file. Every field has a default, so an empty file
//! yields an empty scene paced at 60 frames per second.
//!
//! Malformed durations are not errors: they are clamped when the settings
//! are turned into runtime components.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sweeper_types::{Activator, Axis, ContactEvent, ContactKind, Vec3};

use crate::door::DEFAULT_MOVE_TIME;
use crate::easing::Easing;
use crate::hazard::{HazardFilter, LayerMask};
use crate::pacing::FramePacer;
use crate::plate::PlateConfig;
use crate::reload::ReloadPolicy;
use crate::sequencer::SweepConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level scene configuration.
///
/// Mirrors the structure of `sweeper-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SceneConfig {
    /// Frame pacing and run bounds.
    #[serde(default)]
    pub driver: DriverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Sweeping bodies and hazards.
    #[serde(default)]
    pub sweepers: Vec<SweeperSettings>,

    /// Goal volumes.
    #[serde(default)]
    pub goals: Vec<GoalSettings>,

    /// Pressure plates.
    #[serde(default)]
    pub plates: Vec<PlateSettings>,

    /// Sliding doors.
    #[serde(default)]
    pub doors: Vec<DoorSettings>,

    /// Timed contacts replayed against the scene.
    #[serde(default)]
    pub script: Vec<ScriptedContact>,
}

impl SceneConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Frame pacing and run bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriverConfig {
    /// Target ticks per second (clamped to 15..=240).
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,

    /// Never exceed `monitor_refresh_hz`.
    #[serde(default)]
    pub clamp_to_monitor: bool,

    /// Refresh rate used when `clamp_to_monitor` is set.
    #[serde(default = "default_target_fps")]
    pub monitor_refresh_hz: u32,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            target_fps: default_target_fps(),
            clamp_to_monitor: false,
            monitor_refresh_hz: default_target_fps(),
            max_ticks: 0,
            max_real_time_seconds: 0,
        }
    }
}

impl DriverConfig {
    /// The frame pacer described by these settings.
    pub fn pacer(&self) -> FramePacer {
        let pacer = FramePacer::new(self.target_fps);
        if self.clamp_to_monitor {
            pacer.clamp_to_monitor(self.monitor_refresh_hz)
        } else {
            pacer
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Human,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Also write every sweep event to stdout as one JSON object per line.
    #[serde(default)]
    pub events_json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            events_json: false,
        }
    }
}

/// One sweeping body, lethal or not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SweeperSettings {
    /// Unique scene object name.
    pub name: String,

    /// Initial body position.
    #[serde(default)]
    pub position: Vec3,

    /// Axis the body sweeps along.
    #[serde(default)]
    pub axis: Axis,

    /// First endpoint.
    #[serde(default)]
    pub start_value: f64,

    /// Second endpoint.
    #[serde(default)]
    pub end_value: f64,

    /// Snap to `start_value` on activation.
    #[serde(default = "default_true")]
    pub snap_to_start: bool,

    /// Seconds for one leg.
    #[serde(default = "default_leg_duration")]
    pub leg_duration: f64,

    /// Seconds to rest at each endpoint.
    #[serde(default = "default_pause_duration")]
    pub pause_duration: f64,

    /// Seconds of warning before each leg.
    #[serde(default = "default_telegraph_lead")]
    pub telegraph_lead: f64,

    /// Easing applied to each leg.
    #[serde(default)]
    pub easing: Easing,

    /// Whether contacts can kill.
    #[serde(default = "default_true")]
    pub kill_on_contact: bool,

    /// Whether contacts only kill during motion.
    #[serde(default = "default_true")]
    pub kill_only_while_moving: bool,

    /// Tag of the killable activator. Empty accepts any tag.
    #[serde(default = "default_player_tag")]
    pub player_tag: String,

    /// Layers that can be killed.
    #[serde(default)]
    pub kill_layers: LayerMask,

    /// Minimum seconds between a kill and the reload.
    #[serde(default = "default_reload_delay")]
    pub reload_delay: f64,

    /// Duration of the blink effect, if any.
    #[serde(default)]
    pub blink_duration: Option<f64>,
}

impl SweeperSettings {
    /// The sequencer configuration.
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig::new(
            self.start_value,
            self.end_value,
            self.leg_duration,
            self.pause_duration,
            self.telegraph_lead,
            self.easing.clone().shared(),
        )
        .with_snap_to_start(self.snap_to_start)
    }

    /// The kill filter.
    pub fn filter(&self) -> HazardFilter {
        let filter = if self.player_tag.is_empty() {
            HazardFilter::any()
        } else {
            HazardFilter::tag(self.player_tag.clone())
        };
        filter.on_layers(self.kill_layers)
    }

    /// The reload policy after a kill.
    pub const fn reload_policy(&self) -> ReloadPolicy {
        ReloadPolicy {
            reload_delay: self.reload_delay,
            blink_duration: self.blink_duration,
        }
    }
}

/// A goal volume.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GoalSettings {
    /// Unique scene object name.
    pub name: String,

    /// Tag that completes the goal. Empty accepts any tag.
    #[serde(default = "default_player_tag")]
    pub tag: String,

    /// Minimum seconds before the reload.
    #[serde(default = "default_reload_delay")]
    pub reload_delay: f64,

    /// Duration of the blink effect, if any.
    #[serde(default)]
    pub blink_duration: Option<f64>,
}

impl GoalSettings {
    /// The reload policy after the goal is reached.
    pub const fn reload_policy(&self) -> ReloadPolicy {
        ReloadPolicy {
            reload_delay: self.reload_delay,
            blink_duration: self.blink_duration,
        }
    }
}

/// A pressure plate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlateSettings {
    /// Unique scene object name.
    pub name: String,

    /// Rest position of the plate visual.
    #[serde(default)]
    pub position: Vec3,

    /// Layers allowed to press the plate.
    #[serde(default)]
    pub activator_layers: LayerMask,

    /// Any of these tags presses the plate.
    #[serde(default = "default_plate_tags")]
    pub allowed_tags: Vec<String>,

    /// Accept any tag when `allowed_tags` is empty.
    #[serde(default = "default_true")]
    pub accept_any_when_empty: bool,

    /// How far the visual sinks.
    #[serde(default = "default_press_depth")]
    pub press_depth: f64,

    /// Seconds to sink.
    #[serde(default = "default_press_time")]
    pub press_time: f64,

    /// Seconds to rise.
    #[serde(default = "default_release_time")]
    pub release_time: f64,

    /// Sinking curve.
    #[serde(default)]
    pub press_curve: Easing,

    /// Rising curve.
    #[serde(default)]
    pub release_curve: Easing,

    /// Name of the door this plate controls.
    #[serde(default)]
    pub door: Option<String>,

    /// Keep the door open once pressed.
    #[serde(default = "default_true")]
    pub latch_door_open: bool,

    /// Close the door on release (only when not latched).
    #[serde(default)]
    pub close_door_on_release: bool,

    /// Seconds between release and closing.
    #[serde(default = "default_door_close_delay")]
    pub door_close_delay: f64,
}

impl PlateSettings {
    /// The runtime plate tuning.
    pub fn plate_config(&self) -> PlateConfig {
        PlateConfig {
            filter: HazardFilter {
                layers: self.activator_layers,
                tags: self.allowed_tags.clone(),
                accept_any_when_empty: self.accept_any_when_empty,
            },
            press_depth: self.press_depth,
            press_time: self.press_time,
            release_time: self.release_time,
            press_curve: self.press_curve.clone().shared(),
            release_curve: self.release_curve.clone().shared(),
            latch_door_open: self.latch_door_open,
            close_door_on_release: self.close_door_on_release,
            door_close_delay: self.door_close_delay,
        }
    }
}

/// A sliding door.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DoorSettings {
    /// Unique scene object name.
    pub name: String,

    /// Closed panel position.
    #[serde(default)]
    pub position: Vec3,

    /// Offset from closed to open.
    #[serde(default = "default_open_offset")]
    pub open_offset: Vec3,

    /// Seconds to open or close.
    #[serde(default = "default_move_time")]
    pub move_time: f64,

    /// Panel easing.
    #[serde(default)]
    pub easing: Easing,

    /// Start in the closed position.
    #[serde(default = "default_true")]
    pub start_closed: bool,
}

/// A contact replayed at a fixed time after each scene (re)load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptedContact {
    /// Seconds after the scene was loaded.
    pub at: f64,

    /// Name of the scene object touched.
    pub target: String,

    /// Activator tag.
    #[serde(default = "default_player_tag")]
    pub tag: String,

    /// Activator layer.
    #[serde(default)]
    pub layer: u8,

    /// Enter or exit.
    #[serde(default)]
    pub kind: ContactKind,
}

impl ScriptedContact {
    /// The contact event this entry describes.
    pub fn to_event(&self) -> ContactEvent {
        ContactEvent {
            activator: Activator::new(self.tag.clone(), self.layer),
            kind: self.kind,
            timestamp: self.at,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_target_fps() -> u32 {
    60
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

const fn default_leg_duration() -> f64 {
    2.5
}

const fn default_pause_duration() -> f64 {
    0.35
}

const fn default_telegraph_lead() -> f64 {
    0.25
}

fn default_player_tag() -> String {
    "Player".to_owned()
}

const fn default_reload_delay() -> f64 {
    0.35
}

fn default_plate_tags() -> Vec<String> {
    vec!["Player".to_owned(), "Crate".to_owned()]
}

const fn default_press_depth() -> f64 {
    0.06
}

const fn default_press_time() -> f64 {
    0.12
}

const fn default_release_time() -> f64 {
    0.15
}

const fn default_door_close_delay() -> f64 {
    0.25
}

const fn default_open_offset() -> Vec3 {
    Vec3::new(0.0, 0.0, -2.0)
}

const fn default_move_time() -> f64 {
    DEFAULT_MOVE_TIME
}
