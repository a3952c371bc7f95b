//! Numeric envelopes enforced at each pipeline stage.
//!
//! Stages disagree on purpose: a document may describe a 500 m waypoint,
//! its safety-limit block may allow 150 m, and the aircraft accepts at most
//! 120 m. Each stage owns its own envelope value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed, half-open or open interval over `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub min_exclusive: bool,
    #[serde(default)]
    pub max_exclusive: bool,
}

impl ValueRange {
    /// `[min, max]`
    pub const fn inclusive(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_exclusive: false,
            max_exclusive: false,
        }
    }

    /// `[min, max)`
    pub const fn half_open(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_exclusive: false,
            max_exclusive: true,
        }
    }

    /// `(min, max]`
    pub const fn above(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_exclusive: true,
            max_exclusive: false,
        }
    }

    /// NaN and infinities are never contained.
    pub fn contains(&self, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        let above_min = if self.min_exclusive {
            value > self.min
        } else {
            value >= self.min
        };
        let below_max = if self.max_exclusive {
            value < self.max
        } else {
            value <= self.max
        };
        above_min && below_max
    }

    /// Same range with a different upper bound (used for `autoSpeed ≤ maxSpeed`).
    pub fn with_max(self, max: f64) -> Self {
        Self { max, ..self }
    }

    /// Nearest contained value for closed ranges; exclusive bounds are
    /// treated as closed.
    pub fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.min_exclusive { '(' } else { '[' };
        let close = if self.max_exclusive { ')' } else { ']' };
        write!(f, "{open}{},{}{close}", self.min, self.max)
    }
}

/// Closed interval over counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn contains_len(&self, len: usize) -> bool {
        u32::try_from(len).map(|n| self.contains(n)).unwrap_or(false)
    }
}

impl fmt::Display for CountRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.min, self.max)
    }
}

/// Document-level sanity bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEnvelope {
    pub waypoint_count: CountRange,
    pub altitude_m: ValueRange,
    pub heading_deg: ValueRange,
    pub gimbal_pitch_deg: ValueRange,
    pub waypoint_speed_mps: ValueRange,
    pub corner_radius_m: ValueRange,
    pub action_repeat_times: CountRange,
    pub action_timeout_s: ValueRange,
    pub recording_duration_s: ValueRange,
    pub max_speed_mps: ValueRange,
    /// Lower bound for `autoFlightSpeed`; the upper bound is the document's own max speed.
    pub min_auto_speed_mps: f64,
    pub repeat_times: CountRange,
    pub supported_schema_versions: Vec<String>,
}

impl Default for DocumentEnvelope {
    fn default() -> Self {
        Self {
            waypoint_count: CountRange::new(1, 99),
            altitude_m: ValueRange::inclusive(0.0, 500.0),
            heading_deg: ValueRange::half_open(0.0, 360.0),
            gimbal_pitch_deg: ValueRange::inclusive(-90.0, 30.0),
            waypoint_speed_mps: ValueRange::inclusive(0.5, 25.0),
            corner_radius_m: ValueRange::inclusive(0.2, 1000.0),
            action_repeat_times: CountRange::new(1, 15),
            action_timeout_s: ValueRange::inclusive(0.0, 999.0),
            recording_duration_s: ValueRange::above(0.0, 3600.0),
            max_speed_mps: ValueRange::inclusive(1.0, 25.0),
            min_auto_speed_mps: 0.5,
            repeat_times: CountRange::new(1, 10),
            supported_schema_versions: vec![crate::document::SCHEMA_VERSION.to_string()],
        }
    }
}

/// Bounds on the values an author may put in the `safetyLimits` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyEnvelope {
    pub max_altitude_m: ValueRange,
    pub max_distance_from_home_m: ValueRange,
    pub min_battery_percent: ValueRange,
    pub min_gps_level: CountRange,
    pub geofence_radius_m: ValueRange,
}

impl Default for SafetyEnvelope {
    fn default() -> Self {
        Self {
            max_altitude_m: ValueRange::inclusive(10.0, 150.0),
            max_distance_from_home_m: ValueRange::inclusive(10.0, 8000.0),
            min_battery_percent: ValueRange::inclusive(10.0, 50.0),
            min_gps_level: CountRange::new(0, 5),
            geofence_radius_m: ValueRange::inclusive(10.0, 20_000.0),
        }
    }
}

/// Bounds re-checked on the canonical flight plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightPlanEnvelope {
    pub waypoint_count: CountRange,
    pub altitude_m: ValueRange,
    pub heading_deg: ValueRange,
    pub gimbal_pitch_deg: ValueRange,
    pub max_speed_mps: ValueRange,
    pub max_segment_distance_m: f64,
}

impl Default for FlightPlanEnvelope {
    fn default() -> Self {
        Self {
            waypoint_count: CountRange::new(2, 99),
            altitude_m: ValueRange::inclusive(0.0, 500.0),
            heading_deg: ValueRange::half_open(0.0, 360.0),
            gimbal_pitch_deg: ValueRange::inclusive(-90.0, 30.0),
            max_speed_mps: ValueRange::above(0.0, 15.0),
            max_segment_distance_m: 1000.0,
        }
    }
}

/// Hardware limits of the target flight controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorEnvelope {
    pub waypoint_count: CountRange,
    pub altitude_m: ValueRange,
    pub max_speed_mps: ValueRange,
    pub min_auto_speed_mps: f64,
    pub heading_deg: ValueRange,
    pub gimbal_pitch_deg: ValueRange,
    pub corner_radius_m: ValueRange,
    pub waypoint_speed_mps: ValueRange,
    pub action_repeat_times: CountRange,
    pub action_timeout_s: ValueRange,
    pub repeat_times: CountRange,
    pub max_actions_per_waypoint: usize,
    pub max_stay_ms: u32,
}

impl Default for VendorEnvelope {
    fn default() -> Self {
        Self {
            waypoint_count: CountRange::new(1, 99),
            altitude_m: ValueRange::inclusive(2.0, 120.0),
            max_speed_mps: ValueRange::inclusive(1.0, 15.0),
            min_auto_speed_mps: 0.5,
            heading_deg: ValueRange::half_open(0.0, 360.0),
            gimbal_pitch_deg: ValueRange::inclusive(-90.0, 30.0),
            corner_radius_m: ValueRange::inclusive(0.2, 1000.0),
            waypoint_speed_mps: ValueRange::inclusive(0.5, 15.0),
            action_repeat_times: CountRange::new(1, 15),
            action_timeout_s: ValueRange::inclusive(0.0, 999.0),
            repeat_times: CountRange::new(1, 255),
            max_actions_per_waypoint: 15,
            max_stay_ms: 32_767,
        }
    }
}

/// Every stage envelope, passed to the pipeline at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineRules {
    pub document: DocumentEnvelope,
    pub safety: SafetyEnvelope,
    pub flight_plan: FlightPlanEnvelope,
    pub vendor: VendorEnvelope,
}

impl PipelineRules {
    /// Parse rules from JSON; missing sections fall back to defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
