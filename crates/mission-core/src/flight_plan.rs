//! Canonical in-memory flight plan used for planning and geometry.

use crate::geometry::{self, Coordinate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlan {
    pub waypoints: Vec<FlightPlanWaypoint>,
    pub max_speed_mps: f64,
    pub auto_speed_mps: f64,
    pub finished_action: FinishAction,
    pub heading_mode: HeadingMode,
}

impl FlightPlan {
    /// Total path length in meters.
    pub fn total_distance_m(&self) -> f64 {
        geometry::path_length(self.coordinates())
    }

    /// Estimated duration in seconds, see [`geometry::estimated_flight_time`].
    pub fn estimated_flight_time_s(&self) -> f64 {
        geometry::estimated_flight_time(self)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = &Coordinate> {
        self.waypoints.iter().map(|wp| &wp.coordinate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanWaypoint {
    pub coordinate: Coordinate,
    pub altitude_m: f64,
    #[serde(default)]
    pub heading_deg: Option<f64>,
    #[serde(default)]
    pub gimbal_pitch_deg: Option<f64>,
}

impl FlightPlanWaypoint {
    pub fn new(coordinate: Coordinate, altitude_m: f64) -> Self {
        Self {
            coordinate,
            altitude_m,
            heading_deg: None,
            gimbal_pitch_deg: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishAction {
    /// Hover at the last waypoint
    Hover,
    /// Return to the home point
    GoHome,
    /// Land at the last waypoint
    AutoLand,
    /// Fly back to the first waypoint
    ReturnToFirstWaypoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingMode {
    /// Nose follows the direction of travel
    Auto,
    /// Keep the heading held at mission start
    InitialDirection,
    /// Pilot controls yaw
    RemoteControlled,
    /// Use each waypoint's own heading
    WaypointHeading,
}

/// Derived figures for a plan, handy for previews and logs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MissionSummary {
    pub waypoint_count: usize,
    pub total_distance_m: f64,
    pub estimated_flight_time_s: f64,
}

impl From<&FlightPlan> for MissionSummary {
    fn from(plan: &FlightPlan) -> Self {
        Self {
            waypoint_count: plan.waypoints.len(),
            total_distance_m: plan.total_distance_m(),
            estimated_flight_time_s: plan.estimated_flight_time_s(),
        }
    }
}
