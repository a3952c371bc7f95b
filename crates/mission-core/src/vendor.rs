//! Vendor Mission: the lowered structure handed to the upload collaborator.
//!
//! Every intent is explicit here. Nothing relies on controller-side defaults.

use crate::geometry::Coordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMission {
    pub settings: VendorMissionSettings,
    pub waypoints: Vec<VendorWaypoint>,
}

impl VendorMission {
    pub fn action_count(&self) -> usize {
        self.waypoints.iter().map(|wp| wp.actions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMissionSettings {
    pub max_flight_speed: f64,
    pub auto_flight_speed: f64,
    pub finished_action: VendorFinishedAction,
    pub heading_mode: VendorHeadingMode,
    pub goto_first_waypoint_mode: VendorGotoFirstWaypointMode,
    pub exit_mission_on_signal_lost: bool,
    pub repeat_times: u32,
    pub flight_path_mode: VendorFlightPathMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VendorFinishedAction {
    NoAction,
    GoHome,
    AutoLand,
    GoFirstWaypoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VendorHeadingMode {
    Auto,
    UsingInitialDirection,
    ControlledByRemoteController,
    UsingWaypointHeading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VendorGotoFirstWaypointMode {
    Safely,
    PointToPoint,
}

/// Straight legs between waypoints, or curves honoring each corner radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VendorFlightPathMode {
    Normal,
    Curved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VendorTurnMode {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorWaypoint {
    pub coordinate: Coordinate,
    #[serde(rename = "altitude")]
    pub altitude_m: f64,
    #[serde(rename = "heading")]
    pub heading_deg: f64,
    #[serde(rename = "cornerRadiusInMeters")]
    pub corner_radius_m: f64,
    pub turn_mode: VendorTurnMode,
    #[serde(rename = "speed", default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    pub action_timeout_seconds: f64,
    pub action_repeat_times: u32,
    pub actions: Vec<VendorAction>,
}

/// Concrete controller action, executed in list order at the waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "camelCase")]
pub enum VendorAction {
    ShootPhoto,
    StartRecord,
    StopRecord,
    Stay { milliseconds: u32 },
    RotateGimbalPitch { pitch: f64 },
    RotateAircraft { heading: f64 },
}

impl VendorAction {
    pub fn is_photo(&self) -> bool {
        matches!(self, Self::ShootPhoto)
    }
}
