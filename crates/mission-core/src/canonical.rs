//! Conversion from a validated Mission Document to the canonical Flight Plan.

use crate::document::{DocumentHeadingMode, FinishedAction, MissionDocument, MissionWaypoint};
use crate::flight_plan::{FinishAction, FlightPlan, FlightPlanWaypoint, HeadingMode};

impl From<FinishedAction> for FinishAction {
    fn from(action: FinishedAction) -> Self {
        match action {
            FinishedAction::None => Self::Hover,
            FinishedAction::GoHome => Self::GoHome,
            FinishedAction::AutoLand => Self::AutoLand,
            FinishedAction::GoFirstWaypoint => Self::ReturnToFirstWaypoint,
        }
    }
}

impl From<FinishAction> for FinishedAction {
    fn from(action: FinishAction) -> Self {
        match action {
            FinishAction::Hover => Self::None,
            FinishAction::GoHome => Self::GoHome,
            FinishAction::AutoLand => Self::AutoLand,
            FinishAction::ReturnToFirstWaypoint => Self::GoFirstWaypoint,
        }
    }
}

impl From<DocumentHeadingMode> for HeadingMode {
    fn from(mode: DocumentHeadingMode) -> Self {
        match mode {
            DocumentHeadingMode::Auto => Self::Auto,
            DocumentHeadingMode::InitialDirection => Self::InitialDirection,
            DocumentHeadingMode::RcControlled => Self::RemoteControlled,
            DocumentHeadingMode::WaypointHeading => Self::WaypointHeading,
        }
    }
}

impl From<HeadingMode> for DocumentHeadingMode {
    fn from(mode: HeadingMode) -> Self {
        match mode {
            HeadingMode::Auto => Self::Auto,
            HeadingMode::InitialDirection => Self::InitialDirection,
            HeadingMode::RemoteControlled => Self::RcControlled,
            HeadingMode::WaypointHeading => Self::WaypointHeading,
        }
    }
}

impl From<&MissionWaypoint> for FlightPlanWaypoint {
    fn from(wp: &MissionWaypoint) -> Self {
        Self {
            coordinate: wp.coordinate,
            altitude_m: wp.altitude_m,
            heading_deg: wp.heading_deg,
            gimbal_pitch_deg: wp.gimbal_pitch_deg,
        }
    }
}

/// Reduce a document to the canonical plan.
///
/// Speeds, turn metadata and actions are dropped; lowering that needs them
/// works from the original document instead.
pub fn canonicalize(doc: &MissionDocument) -> FlightPlan {
    FlightPlan {
        waypoints: doc.waypoints.iter().map(FlightPlanWaypoint::from).collect(),
        max_speed_mps: doc.settings.max_speed_mps,
        auto_speed_mps: doc.settings.auto_speed_mps,
        finished_action: doc.settings.finished_action.into(),
        heading_mode: doc.settings.heading_mode.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MissionAction, MissionMetadata, MissionSettings, SafetyLimits};
    use crate::geometry::Coordinate;

    #[test]
    fn canonicalize_keeps_geometry_and_orientation() {
        let doc = MissionDocument {
            metadata: MissionMetadata::new("Canon", "tester"),
            settings: MissionSettings {
                finished_action: FinishedAction::AutoLand,
                heading_mode: DocumentHeadingMode::RcControlled,
                ..MissionSettings::default()
            },
            waypoints: vec![
                MissionWaypoint::new(Coordinate::new(1.0, 2.0), 30.0)
                    .with_heading(90.0)
                    .with_action(MissionAction::take_photo()),
                MissionWaypoint::new(Coordinate::new(1.001, 2.0), 35.0).with_gimbal_pitch(-60.0),
            ],
            safety_limits: SafetyLimits::default(),
        };

        let plan = canonicalize(&doc);
        assert_eq!(plan.waypoints.len(), 2);
        assert_eq!(plan.waypoints[0].heading_deg, Some(90.0));
        assert_eq!(plan.waypoints[1].gimbal_pitch_deg, Some(-60.0));
        assert_eq!(plan.waypoints[1].altitude_m, 35.0);
        assert_eq!(plan.finished_action, FinishAction::AutoLand);
        assert_eq!(plan.heading_mode, HeadingMode::RemoteControlled);
        assert_eq!(plan.max_speed_mps, doc.settings.max_speed_mps);
    }

    #[test]
    fn enum_tables_are_inverse() {
        for action in [
            FinishedAction::None,
            FinishedAction::GoHome,
            FinishedAction::AutoLand,
            FinishedAction::GoFirstWaypoint,
        ] {
            assert_eq!(FinishedAction::from(FinishAction::from(action)), action);
        }
        for mode in [
            DocumentHeadingMode::Auto,
            DocumentHeadingMode::InitialDirection,
            DocumentHeadingMode::RcControlled,
            DocumentHeadingMode::WaypointHeading,
        ] {
            assert_eq!(DocumentHeadingMode::from(HeadingMode::from(mode)), mode);
        }
    }
}
