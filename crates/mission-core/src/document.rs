//! Mission Document: the portable, human-editable JSON mission description.
//!
//! Field names on the wire are camelCase and must stay stable; the Rust
//! field names carry units instead.

use crate::geometry::Coordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Schema version written by this crate.
pub const SCHEMA_VERSION: &str = "1.0";

pub const DEFAULT_CORNER_RADIUS_M: f64 = 0.2;
pub const DEFAULT_ACTION_TIMEOUT_S: f64 = 60.0;
pub const DEFAULT_ACTION_REPEAT_TIMES: u32 = 1;
pub const DEFAULT_REPEAT_TIMES: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionDocument {
    pub metadata: MissionMetadata,
    pub settings: MissionSettings,
    pub waypoints: Vec<MissionWaypoint>,
    pub safety_limits: SafetyLimits,
}

impl MissionDocument {
    /// Parse a document from JSON bytes. Structure only; no range checks.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty-printed JSON for persistence.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> {
        self.waypoints.iter().map(|wp| &wp.coordinate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionMetadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub schema_version: String,
}

impl MissionMetadata {
    /// Fresh metadata stamped with the current time.
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            author: author.into(),
            tags: Vec::new(),
            created_at: now,
            modified_at: now,
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionSettings {
    #[serde(rename = "maxFlightSpeed", alias = "maxSpeed")]
    pub max_speed_mps: f64,
    #[serde(rename = "autoFlightSpeed", alias = "autoSpeed")]
    pub auto_speed_mps: f64,
    pub finished_action: FinishedAction,
    pub heading_mode: DocumentHeadingMode,
    #[serde(default)]
    pub goto_first_waypoint_mode: GotoFirstWaypointMode,
    #[serde(default)]
    pub exit_on_signal_lost: bool,
    #[serde(default = "default_repeat_times")]
    pub repeat_times: u32,
}

fn default_repeat_times() -> u32 {
    DEFAULT_REPEAT_TIMES
}

impl Default for MissionSettings {
    fn default() -> Self {
        Self {
            max_speed_mps: 15.0,
            auto_speed_mps: 8.0,
            finished_action: FinishedAction::GoHome,
            heading_mode: DocumentHeadingMode::Auto,
            goto_first_waypoint_mode: GotoFirstWaypointMode::Safely,
            exit_on_signal_lost: false,
            repeat_times: DEFAULT_REPEAT_TIMES,
        }
    }
}

/// What the aircraft does after the last waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishedAction {
    None,
    GoHome,
    AutoLand,
    GoFirstWaypoint,
}

/// How the aircraft yaws between waypoints.
///
/// Only exact spellings are accepted; anything else fails to parse rather
/// than quietly degrading to `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentHeadingMode {
    Auto,
    #[serde(alias = "usingInitialDirection")]
    InitialDirection,
    #[serde(alias = "controlledByRemoteController")]
    RcControlled,
    #[serde(alias = "usingWaypointHeading")]
    WaypointHeading,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GotoFirstWaypointMode {
    #[default]
    Safely,
    PointToPoint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TurnMode {
    #[default]
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionWaypoint {
    pub coordinate: Coordinate,
    #[serde(rename = "altitude")]
    pub altitude_m: f64,
    #[serde(rename = "heading", default, skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    #[serde(rename = "gimbalPitch", default, skip_serializing_if = "Option::is_none")]
    pub gimbal_pitch_deg: Option<f64>,
    #[serde(rename = "speed", default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(rename = "cornerRadius", default = "default_corner_radius")]
    pub corner_radius_m: f64,
    #[serde(default)]
    pub turn_mode: TurnMode,
    #[serde(default = "default_action_timeout")]
    pub action_timeout_seconds: f64,
    #[serde(default = "default_action_repeat_times")]
    pub action_repeat_times: u32,
    #[serde(default)]
    pub actions: Vec<MissionAction>,
}

fn default_corner_radius() -> f64 {
    DEFAULT_CORNER_RADIUS_M
}

fn default_action_timeout() -> f64 {
    DEFAULT_ACTION_TIMEOUT_S
}

fn default_action_repeat_times() -> u32 {
    DEFAULT_ACTION_REPEAT_TIMES
}

impl MissionWaypoint {
    /// Waypoint with template defaults and no actions.
    pub fn new(coordinate: Coordinate, altitude_m: f64) -> Self {
        Self {
            coordinate,
            altitude_m,
            heading_deg: None,
            gimbal_pitch_deg: None,
            speed_mps: None,
            corner_radius_m: DEFAULT_CORNER_RADIUS_M,
            turn_mode: TurnMode::Clockwise,
            action_timeout_seconds: DEFAULT_ACTION_TIMEOUT_S,
            action_repeat_times: DEFAULT_ACTION_REPEAT_TIMES,
            actions: Vec::new(),
        }
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = Some(heading_deg);
        self
    }

    pub fn with_gimbal_pitch(mut self, pitch_deg: f64) -> Self {
        self.gimbal_pitch_deg = Some(pitch_deg);
        self
    }

    pub fn with_action(mut self, action: MissionAction) -> Self {
        self.actions.push(action);
        self
    }
}

/// Action tag as written in the document.
///
/// Unknown tags are kept verbatim so validation can reject them with the
/// waypoint and action index attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    TakePhoto,
    StartRecording,
    StopRecording,
    RotateGimbal,
    RotateAircraft,
    #[serde(untagged)]
    Unrecognized(String),
}

/// A declarative hardware directive attached to a waypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionAction {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

/// Typed form of a [`MissionAction`] whose tag and required parameters are present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionCommand {
    TakePhoto,
    StartRecording { duration_s: Option<f64> },
    StopRecording,
    RotateGimbal { pitch_deg: f64 },
    RotateAircraft { heading_deg: f64 },
}

/// Why an action could not be resolved into an [`ActionCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIssue {
    UnknownType(String),
    MissingParameter(&'static str),
}

impl std::fmt::Display for ActionIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType(tag) => write!(f, "unknown action type '{tag}'"),
            Self::MissingParameter(name) => write!(f, "missing required parameter '{name}'"),
        }
    }
}

impl MissionAction {
    fn bare(kind: ActionKind) -> Self {
        Self {
            kind,
            duration_seconds: None,
            pitch: None,
            heading: None,
        }
    }

    pub fn take_photo() -> Self {
        Self::bare(ActionKind::TakePhoto)
    }

    pub fn start_recording(duration_s: Option<f64>) -> Self {
        Self {
            duration_seconds: duration_s,
            ..Self::bare(ActionKind::StartRecording)
        }
    }

    pub fn stop_recording() -> Self {
        Self::bare(ActionKind::StopRecording)
    }

    pub fn rotate_gimbal(pitch_deg: f64) -> Self {
        Self {
            pitch: Some(pitch_deg),
            ..Self::bare(ActionKind::RotateGimbal)
        }
    }

    pub fn rotate_aircraft(heading_deg: f64) -> Self {
        Self {
            heading: Some(heading_deg),
            ..Self::bare(ActionKind::RotateAircraft)
        }
    }

    /// Resolve the tag and its required parameter. Ranges are not checked here.
    pub fn resolve(&self) -> Result<ActionCommand, ActionIssue> {
        match &self.kind {
            ActionKind::TakePhoto => Ok(ActionCommand::TakePhoto),
            ActionKind::StartRecording => Ok(ActionCommand::StartRecording {
                duration_s: self.duration_seconds,
            }),
            ActionKind::StopRecording => Ok(ActionCommand::StopRecording),
            ActionKind::RotateGimbal => self
                .pitch
                .map(|pitch_deg| ActionCommand::RotateGimbal { pitch_deg })
                .ok_or(ActionIssue::MissingParameter("pitch")),
            ActionKind::RotateAircraft => self
                .heading
                .map(|heading_deg| ActionCommand::RotateAircraft { heading_deg })
                .ok_or(ActionIssue::MissingParameter("heading")),
            ActionKind::Unrecognized(tag) => Err(ActionIssue::UnknownType(tag.clone())),
        }
    }
}

impl From<ActionCommand> for MissionAction {
    fn from(command: ActionCommand) -> Self {
        match command {
            ActionCommand::TakePhoto => Self::take_photo(),
            ActionCommand::StartRecording { duration_s } => Self::start_recording(duration_s),
            ActionCommand::StopRecording => Self::stop_recording(),
            ActionCommand::RotateGimbal { pitch_deg } => Self::rotate_gimbal(pitch_deg),
            ActionCommand::RotateAircraft { heading_deg } => Self::rotate_aircraft(heading_deg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyLimits {
    #[serde(rename = "maxAltitude")]
    pub max_altitude_m: f64,
    #[serde(rename = "maxDistanceFromHome")]
    pub max_distance_from_home_m: f64,
    pub min_battery_percent: f64,
    #[serde(rename = "minGPSLevel")]
    pub min_gps_level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence_center: Option<Coordinate>,
    #[serde(rename = "geofenceRadius", default, skip_serializing_if = "Option::is_none")]
    pub geofence_radius_m: Option<f64>,
}

impl Default for SafetyLimits {
    fn default() -> Self {
        Self {
            max_altitude_m: 120.0,
            max_distance_from_home_m: 1000.0,
            min_battery_percent: 25.0,
            min_gps_level: 4,
            geofence_center: None,
            geofence_radius_m: None,
        }
    }
}
