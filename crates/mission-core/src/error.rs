//! Error types for the mission pipeline.
//!
//! Every error carries its location (stage, waypoint, action) as data so
//! callers can render a precise message without parsing strings.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The validation layer that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Metadata,
    Waypoints,
    Settings,
    SafetyLimits,
    FlightPlan,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Metadata => "metadata",
            Self::Waypoints => "waypoints",
            Self::Settings => "settings",
            Self::SafetyLimits => "safetyLimits",
            Self::FlightPlan => "flightPlan",
        };
        f.write_str(name)
    }
}

/// First violation found by a document or flight-plan validator.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(rename_all = "camelCase")]
#[error(
    "{stage} check failed{}: {reason}",
    describe_location(.waypoint_index, .action_index, .segment)
)]
pub struct ValidationError {
    pub stage: Stage,
    pub waypoint_index: Option<usize>,
    pub action_index: Option<usize>,
    /// Both ends of an offending segment, for distance rules.
    pub segment: Option<(usize, usize)>,
    /// Wire name of the offending field.
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(stage: Stage, field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            stage,
            waypoint_index: None,
            action_index: None,
            segment: None,
            field,
            reason: reason.into(),
        }
    }

    /// `"<field> out of <range>"`
    pub fn out_of_range(stage: Stage, field: &'static str, range: impl fmt::Display) -> Self {
        Self::new(stage, field, format!("{field} out of {range}"))
    }

    pub fn at_waypoint(mut self, index: usize) -> Self {
        self.waypoint_index = Some(index);
        self
    }

    pub fn at_action(mut self, index: usize) -> Self {
        self.action_index = Some(index);
        self
    }

    pub fn between(mut self, from: usize, to: usize) -> Self {
        self.waypoint_index = Some(from);
        self.segment = Some((from, to));
        self
    }
}

fn describe_location(
    waypoint_index: &Option<usize>,
    action_index: &Option<usize>,
    segment: &Option<(usize, usize)>,
) -> String {
    match (segment, waypoint_index, action_index) {
        (Some((from, to)), _, _) => format!(" between waypoints {from} and {to}"),
        (None, Some(wp), Some(action)) => format!(" at waypoint {wp}, action {action}"),
        (None, Some(wp), None) => format!(" at waypoint {wp}"),
        _ => String::new(),
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed mission document: {0}")]
    MalformedInput(#[from] serde_json::Error),

    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),
}

impl ImportError {
    /// The structured violation, when the input parsed but failed a check.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            Self::ValidationFailed(err) => Some(err),
            Self::MalformedInput(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    #[error("cannot export invalid flight plan: {reason}")]
    InvalidFlightPlan { reason: String },
}

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TranslationError {
    #[error("invalid flight plan: {reason}")]
    InvalidFlightPlan { reason: String },

    #[error("invalid waypoint {index}: {reason}")]
    InvalidWaypoint { index: usize, reason: String },

    #[error("invalid action {action_index} at waypoint {waypoint_index}: {reason}")]
    InvalidAction {
        waypoint_index: usize,
        action_index: usize,
        reason: String,
    },

    #[error(
        "vendor mission rejected{}: {reason}",
        describe_location(.waypoint_index, &None, &None)
    )]
    InvalidVendorMission {
        waypoint_index: Option<usize>,
        reason: String,
    },
}

impl TranslationError {
    pub(crate) fn vendor(reason: impl Into<String>) -> Self {
        Self::InvalidVendorMission {
            waypoint_index: None,
            reason: reason.into(),
        }
    }

    pub(crate) fn vendor_waypoint(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidVendorMission {
            waypoint_index: Some(index),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("invalid template parameters: {0}")]
    InvalidParameters(String),

    #[error("unknown test location: {0}")]
    UnknownLocation(String),
}
