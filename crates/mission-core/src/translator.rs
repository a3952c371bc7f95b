//! Lowering from the canonical plan (or the full document) to a Vendor Mission.
//!
//! Two paths exist. [`lower_basic`] works from a Flight Plan and always
//! produces a photo survey: every waypoint shoots a photo. [`lower_enhanced`]
//! works from the document and carries the declared actions and per-waypoint
//! metadata across one by one.

use crate::document::{
    ActionCommand, DocumentHeadingMode, FinishedAction, GotoFirstWaypointMode, MissionAction,
    MissionDocument, MissionWaypoint, TurnMode,
};
use crate::error::TranslationError;
use crate::flight_plan::{FinishAction, FlightPlan, FlightPlanWaypoint, HeadingMode};
use crate::rules::VendorEnvelope;
use crate::vendor::{
    VendorAction, VendorFinishedAction, VendorFlightPathMode, VendorGotoFirstWaypointMode,
    VendorHeadingMode, VendorMission, VendorMissionSettings, VendorTurnMode, VendorWaypoint,
};
use tracing::{debug, warn};

pub const BASIC_CORNER_RADIUS_M: f64 = 0.2;
pub const BASIC_ACTION_TIMEOUT_S: f64 = 60.0;
pub const BASIC_ACTION_REPEAT_TIMES: u32 = 1;
pub const BASIC_REPEAT_TIMES: u32 = 1;

impl From<FinishAction> for VendorFinishedAction {
    fn from(action: FinishAction) -> Self {
        match action {
            FinishAction::Hover => Self::NoAction,
            FinishAction::GoHome => Self::GoHome,
            FinishAction::AutoLand => Self::AutoLand,
            FinishAction::ReturnToFirstWaypoint => Self::GoFirstWaypoint,
        }
    }
}

impl From<FinishedAction> for VendorFinishedAction {
    fn from(action: FinishedAction) -> Self {
        match action {
            FinishedAction::None => Self::NoAction,
            FinishedAction::GoHome => Self::GoHome,
            FinishedAction::AutoLand => Self::AutoLand,
            FinishedAction::GoFirstWaypoint => Self::GoFirstWaypoint,
        }
    }
}

impl From<HeadingMode> for VendorHeadingMode {
    fn from(mode: HeadingMode) -> Self {
        match mode {
            HeadingMode::Auto => Self::Auto,
            HeadingMode::InitialDirection => Self::UsingInitialDirection,
            HeadingMode::RemoteControlled => Self::ControlledByRemoteController,
            HeadingMode::WaypointHeading => Self::UsingWaypointHeading,
        }
    }
}

impl From<DocumentHeadingMode> for VendorHeadingMode {
    fn from(mode: DocumentHeadingMode) -> Self {
        match mode {
            DocumentHeadingMode::Auto => Self::Auto,
            DocumentHeadingMode::InitialDirection => Self::UsingInitialDirection,
            DocumentHeadingMode::RcControlled => Self::ControlledByRemoteController,
            DocumentHeadingMode::WaypointHeading => Self::UsingWaypointHeading,
        }
    }
}

impl From<GotoFirstWaypointMode> for VendorGotoFirstWaypointMode {
    fn from(mode: GotoFirstWaypointMode) -> Self {
        match mode {
            GotoFirstWaypointMode::Safely => Self::Safely,
            GotoFirstWaypointMode::PointToPoint => Self::PointToPoint,
        }
    }
}

impl From<TurnMode> for VendorTurnMode {
    fn from(mode: TurnMode) -> Self {
        match mode {
            TurnMode::Clockwise => Self::Clockwise,
            TurnMode::CounterClockwise => Self::CounterClockwise,
        }
    }
}

/// Lower a canonical plan into a photo-survey vendor mission.
pub fn lower_basic(
    plan: &FlightPlan,
    env: &VendorEnvelope,
) -> Result<VendorMission, TranslationError> {
    check_count(plan.waypoints.len(), env)?;
    let (max_speed, auto_speed) = lower_speeds(plan.max_speed_mps, plan.auto_speed_mps, env)?;

    let waypoints = plan
        .waypoints
        .iter()
        .enumerate()
        .map(|(index, wp)| lower_plan_waypoint(index, wp, env))
        .collect::<Result<Vec<_>, _>>()?;

    let mission = VendorMission {
        settings: VendorMissionSettings {
            max_flight_speed: max_speed,
            auto_flight_speed: auto_speed,
            finished_action: plan.finished_action.into(),
            heading_mode: plan.heading_mode.into(),
            goto_first_waypoint_mode: VendorGotoFirstWaypointMode::Safely,
            exit_mission_on_signal_lost: false,
            repeat_times: BASIC_REPEAT_TIMES,
            flight_path_mode: VendorFlightPathMode::Normal,
        },
        waypoints,
    };
    debug!(
        waypoints = mission.waypoints.len(),
        actions = mission.action_count(),
        "lowered flight plan (basic)"
    );
    Ok(mission)
}

fn lower_plan_waypoint(
    index: usize,
    wp: &FlightPlanWaypoint,
    env: &VendorEnvelope,
) -> Result<VendorWaypoint, TranslationError> {
    check_altitude(index, wp.altitude_m, env)?;
    let heading_deg = vendor_heading(index, wp.heading_deg, env)?;

    let mut actions = Vec::with_capacity(2);
    if let Some(pitch) = wp.gimbal_pitch_deg {
        actions.push(gimbal_action(index, pitch, env)?);
    }
    actions.push(VendorAction::ShootPhoto);

    Ok(VendorWaypoint {
        coordinate: wp.coordinate,
        altitude_m: wp.altitude_m,
        heading_deg,
        corner_radius_m: BASIC_CORNER_RADIUS_M,
        turn_mode: VendorTurnMode::Clockwise,
        speed_mps: None,
        action_timeout_seconds: BASIC_ACTION_TIMEOUT_S,
        action_repeat_times: BASIC_ACTION_REPEAT_TIMES,
        actions,
    })
}

/// Lower a document, keeping its declared actions and waypoint metadata.
///
/// No photo is injected. A waypoint `gimbalPitch` becomes a leading
/// `rotateGimbalPitch` so the pitch survives without a declared action.
pub fn lower_enhanced(
    doc: &MissionDocument,
    env: &VendorEnvelope,
) -> Result<VendorMission, TranslationError> {
    check_count(doc.waypoints.len(), env)?;
    let settings = &doc.settings;
    let (max_speed, auto_speed) =
        lower_speeds(settings.max_speed_mps, settings.auto_speed_mps, env)?;
    if !env.repeat_times.contains(settings.repeat_times) {
        return Err(TranslationError::vendor(format!(
            "repeatTimes out of {}",
            env.repeat_times
        )));
    }

    let waypoints = doc
        .waypoints
        .iter()
        .enumerate()
        .map(|(index, wp)| lower_document_waypoint(index, wp, env))
        .collect::<Result<Vec<_>, _>>()?;

    let flight_path_mode = if waypoints
        .iter()
        .any(|wp| wp.corner_radius_m > BASIC_CORNER_RADIUS_M)
    {
        VendorFlightPathMode::Curved
    } else {
        VendorFlightPathMode::Normal
    };

    let mission = VendorMission {
        settings: VendorMissionSettings {
            max_flight_speed: max_speed,
            auto_flight_speed: auto_speed,
            finished_action: settings.finished_action.into(),
            heading_mode: settings.heading_mode.into(),
            goto_first_waypoint_mode: settings.goto_first_waypoint_mode.into(),
            exit_mission_on_signal_lost: settings.exit_on_signal_lost,
            repeat_times: settings.repeat_times,
            flight_path_mode,
        },
        waypoints,
    };
    debug!(
        mission = %doc.metadata.name,
        waypoints = mission.waypoints.len(),
        actions = mission.action_count(),
        "lowered mission document (enhanced)"
    );
    Ok(mission)
}

fn lower_document_waypoint(
    index: usize,
    wp: &MissionWaypoint,
    env: &VendorEnvelope,
) -> Result<VendorWaypoint, TranslationError> {
    check_altitude(index, wp.altitude_m, env)?;
    let heading_deg = vendor_heading(index, wp.heading_deg, env)?;
    if !env.corner_radius_m.contains(wp.corner_radius_m) {
        return Err(invalid_waypoint(
            index,
            format!("cornerRadius out of {}", env.corner_radius_m),
        ));
    }
    if let Some(speed) = wp.speed_mps {
        if !env.waypoint_speed_mps.contains(speed) {
            return Err(invalid_waypoint(
                index,
                format!("speed out of {}", env.waypoint_speed_mps),
            ));
        }
    }
    if !env.action_timeout_s.contains(wp.action_timeout_seconds) {
        return Err(invalid_waypoint(
            index,
            format!("actionTimeoutSeconds out of {}", env.action_timeout_s),
        ));
    }
    if !env.action_repeat_times.contains(wp.action_repeat_times) {
        return Err(invalid_waypoint(
            index,
            format!("actionRepeatTimes out of {}", env.action_repeat_times),
        ));
    }

    let mut actions = Vec::with_capacity(wp.actions.len() + 1);
    if let Some(pitch) = wp.gimbal_pitch_deg {
        actions.push(gimbal_action(index, pitch, env)?);
    }
    for (action_index, action) in wp.actions.iter().enumerate() {
        lower_action(index, action_index, action, env, &mut actions)?;
    }
    if actions.len() > env.max_actions_per_waypoint {
        return Err(invalid_waypoint(
            index,
            format!(
                "{} vendor actions exceed the limit of {}",
                actions.len(),
                env.max_actions_per_waypoint
            ),
        ));
    }

    Ok(VendorWaypoint {
        coordinate: wp.coordinate,
        altitude_m: wp.altitude_m,
        heading_deg,
        corner_radius_m: wp.corner_radius_m,
        turn_mode: wp.turn_mode.into(),
        speed_mps: wp.speed_mps,
        action_timeout_seconds: wp.action_timeout_seconds,
        action_repeat_times: wp.action_repeat_times,
        actions,
    })
}

/// Append the vendor actions for one declared action.
fn lower_action(
    waypoint_index: usize,
    action_index: usize,
    action: &MissionAction,
    env: &VendorEnvelope,
    out: &mut Vec<VendorAction>,
) -> Result<(), TranslationError> {
    let invalid = |reason: String| TranslationError::InvalidAction {
        waypoint_index,
        action_index,
        reason,
    };

    let command = action.resolve().map_err(|issue| invalid(issue.to_string()))?;
    match command {
        ActionCommand::TakePhoto => out.push(VendorAction::ShootPhoto),
        ActionCommand::StartRecording { duration_s: None } => out.push(VendorAction::StartRecord),
        ActionCommand::StartRecording {
            duration_s: Some(duration_s),
        } => {
            let milliseconds = stay_milliseconds(duration_s, env).map_err(invalid)?;
            out.extend([
                VendorAction::StartRecord,
                VendorAction::Stay { milliseconds },
                VendorAction::StopRecord,
            ]);
        }
        ActionCommand::StopRecording => out.push(VendorAction::StopRecord),
        ActionCommand::RotateGimbal { pitch_deg } => {
            if !env.gimbal_pitch_deg.contains(pitch_deg) {
                return Err(invalid(format!("pitch out of {}", env.gimbal_pitch_deg)));
            }
            out.push(VendorAction::RotateGimbalPitch { pitch: pitch_deg });
        }
        ActionCommand::RotateAircraft { heading_deg } => {
            if !env.heading_deg.contains(heading_deg) {
                return Err(invalid(format!("heading out of {}", env.heading_deg)));
            }
            out.push(VendorAction::RotateAircraft {
                heading: heading_deg,
            });
        }
    }
    Ok(())
}

fn stay_milliseconds(duration_s: f64, env: &VendorEnvelope) -> Result<u32, String> {
    if !duration_s.is_finite() || duration_s <= 0.0 {
        return Err(format!("durationSeconds {duration_s} must be positive"));
    }
    let milliseconds = (duration_s * 1000.0).round();
    if milliseconds > f64::from(env.max_stay_ms) {
        return Err(format!(
            "stay of {milliseconds} ms exceeds {} ms",
            env.max_stay_ms
        ));
    }
    Ok(milliseconds as u32)
}

fn check_count(count: usize, env: &VendorEnvelope) -> Result<(), TranslationError> {
    if count == 0 {
        return Err(TranslationError::InvalidFlightPlan {
            reason: "no waypoints to lower".to_string(),
        });
    }
    if !env.waypoint_count.contains_len(count) {
        return Err(TranslationError::InvalidFlightPlan {
            reason: format!("waypoint count {count} out of {}", env.waypoint_count),
        });
    }
    Ok(())
}

/// Clamp speeds into the controller envelope; auto speed never exceeds max.
fn lower_speeds(
    max_speed: f64,
    auto_speed: f64,
    env: &VendorEnvelope,
) -> Result<(f64, f64), TranslationError> {
    if !max_speed.is_finite() || !auto_speed.is_finite() {
        return Err(TranslationError::InvalidFlightPlan {
            reason: format!("non-finite speed (max {max_speed}, auto {auto_speed})"),
        });
    }
    let max_clamped = env.max_speed_mps.clamp(max_speed);
    if max_clamped != max_speed {
        warn!(
            requested = max_speed,
            lowered = max_clamped,
            "max flight speed clamped to vendor envelope {}",
            env.max_speed_mps
        );
    }
    let auto_clamped = auto_speed.max(env.min_auto_speed_mps).min(max_clamped);
    if auto_clamped != auto_speed {
        warn!(
            requested = auto_speed,
            lowered = auto_clamped,
            "auto flight speed clamped to [{}, {}]",
            env.min_auto_speed_mps,
            max_clamped
        );
    }
    Ok((max_clamped, auto_clamped))
}

fn check_altitude(
    index: usize,
    altitude_m: f64,
    env: &VendorEnvelope,
) -> Result<(), TranslationError> {
    if env.altitude_m.contains(altitude_m) {
        Ok(())
    } else {
        Err(invalid_waypoint(
            index,
            format!("altitude {altitude_m} m out of {}", env.altitude_m),
        ))
    }
}

fn vendor_heading(
    index: usize,
    heading_deg: Option<f64>,
    env: &VendorEnvelope,
) -> Result<f64, TranslationError> {
    match heading_deg {
        None => Ok(0.0),
        Some(heading) if env.heading_deg.contains(heading) => Ok(heading),
        Some(_) => Err(invalid_waypoint(index, format!("heading out of {}", env.heading_deg))),
    }
}

fn gimbal_action(
    index: usize,
    pitch: f64,
    env: &VendorEnvelope,
) -> Result<VendorAction, TranslationError> {
    if env.gimbal_pitch_deg.contains(pitch) {
        Ok(VendorAction::RotateGimbalPitch { pitch })
    } else {
        Err(invalid_waypoint(
            index,
            format!("gimbalPitch out of {}", env.gimbal_pitch_deg),
        ))
    }
}

fn invalid_waypoint(index: usize, reason: String) -> TranslationError {
    TranslationError::InvalidWaypoint { index, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{MissionMetadata, MissionSettings, SafetyLimits};
    use crate::geometry::{offset_position, Coordinate};

    const BASE: Coordinate = Coordinate {
        lat: 10.32352,
        lon: -84.430511,
    };

    fn plan(altitudes: &[f64]) -> FlightPlan {
        FlightPlan {
            waypoints: altitudes
                .iter()
                .enumerate()
                .map(|(i, alt)| {
                    FlightPlanWaypoint::new(offset_position(&BASE, i as f64 * 50.0, 0.0), *alt)
                })
                .collect(),
            max_speed_mps: 10.0,
            auto_speed_mps: 5.0,
            finished_action: FinishAction::GoHome,
            heading_mode: HeadingMode::Auto,
        }
    }

    fn document(waypoints: Vec<MissionWaypoint>) -> MissionDocument {
        MissionDocument {
            metadata: MissionMetadata::new("Lowering", "tester"),
            settings: MissionSettings::default(),
            waypoints,
            safety_limits: SafetyLimits::default(),
        }
    }

    #[test]
    fn basic_lowering_shoots_photo_everywhere() {
        let mut p = plan(&[30.0, 30.0, 30.0]);
        p.waypoints[1].gimbal_pitch_deg = Some(-90.0);
        p.waypoints[2].heading_deg = Some(180.0);

        let mission = lower_basic(&p, &VendorEnvelope::default()).unwrap();
        assert_eq!(mission.waypoints.len(), 3);
        assert_eq!(mission.waypoints[0].actions, vec![VendorAction::ShootPhoto]);
        assert_eq!(
            mission.waypoints[1].actions,
            vec![
                VendorAction::RotateGimbalPitch { pitch: -90.0 },
                VendorAction::ShootPhoto
            ]
        );
        assert_eq!(mission.waypoints[0].heading_deg, 0.0);
        assert_eq!(mission.waypoints[2].heading_deg, 180.0);
        assert!(mission
            .waypoints
            .iter()
            .all(|wp| wp.corner_radius_m == BASIC_CORNER_RADIUS_M
                && wp.turn_mode == VendorTurnMode::Clockwise));
        assert_eq!(mission.settings.finished_action, VendorFinishedAction::GoHome);
    }

    #[test]
    fn basic_lowering_rejects_altitude_outside_vendor_envelope() {
        let err = lower_basic(&plan(&[30.0, 140.0]), &VendorEnvelope::default()).unwrap_err();
        match err {
            TranslationError::InvalidWaypoint { index, reason } => {
                assert_eq!(index, 1);
                assert!(reason.contains("[2,120]"), "reason was {reason}");
            }
            other => panic!("expected InvalidWaypoint, got {other:?}"),
        }
    }

    #[test]
    fn basic_lowering_rejects_empty_and_oversized_plans() {
        let env = VendorEnvelope::default();
        assert!(matches!(
            lower_basic(&plan(&[]), &env),
            Err(TranslationError::InvalidFlightPlan { .. })
        ));
        let too_many = plan(&[30.0; 100]);
        assert!(matches!(
            lower_basic(&too_many, &env),
            Err(TranslationError::InvalidFlightPlan { .. })
        ));
    }

    #[test]
    fn speeds_are_clamped_into_vendor_envelope() {
        let mut p = plan(&[30.0, 30.0]);
        p.max_speed_mps = 20.0;
        p.auto_speed_mps = 18.0;
        let mission = lower_basic(&p, &VendorEnvelope::default()).unwrap();
        assert_eq!(mission.settings.max_flight_speed, 15.0);
        assert_eq!(mission.settings.auto_flight_speed, 15.0);

        p.max_speed_mps = 0.5;
        p.auto_speed_mps = 0.1;
        let mission = lower_basic(&p, &VendorEnvelope::default()).unwrap();
        assert_eq!(mission.settings.max_flight_speed, 1.0);
        assert_eq!(mission.settings.auto_flight_speed, 0.5);
    }

    #[test]
    fn enhanced_lowering_maps_actions_item_by_item() {
        let wp = MissionWaypoint::new(BASE, 40.0)
            .with_action(MissionAction::take_photo())
            .with_action(MissionAction::start_recording(Some(5.0)))
            .with_action(MissionAction::rotate_aircraft(90.0))
            .with_action(MissionAction::start_recording(None))
            .with_action(MissionAction::stop_recording());
        let mission = lower_enhanced(&document(vec![wp]), &VendorEnvelope::default()).unwrap();
        assert_eq!(
            mission.waypoints[0].actions,
            vec![
                VendorAction::ShootPhoto,
                VendorAction::StartRecord,
                VendorAction::Stay { milliseconds: 5000 },
                VendorAction::StopRecord,
                VendorAction::RotateAircraft { heading: 90.0 },
                VendorAction::StartRecord,
                VendorAction::StopRecord,
            ]
        );
    }

    #[test]
    fn enhanced_lowering_carries_waypoint_metadata() {
        let mut wp = MissionWaypoint::new(BASE, 40.0).with_gimbal_pitch(-45.0);
        wp.corner_radius_m = 5.0;
        wp.turn_mode = TurnMode::CounterClockwise;
        wp.speed_mps = Some(7.5);
        wp.action_timeout_seconds = 30.0;
        let mut doc = document(vec![wp]);
        doc.settings.heading_mode = DocumentHeadingMode::WaypointHeading;
        doc.settings.exit_on_signal_lost = true;

        let mission = lower_enhanced(&doc, &VendorEnvelope::default()).unwrap();
        let lowered = &mission.waypoints[0];
        assert_eq!(lowered.corner_radius_m, 5.0);
        assert_eq!(lowered.turn_mode, VendorTurnMode::CounterClockwise);
        assert_eq!(lowered.speed_mps, Some(7.5));
        assert_eq!(lowered.action_timeout_seconds, 30.0);
        assert_eq!(
            lowered.actions,
            vec![VendorAction::RotateGimbalPitch { pitch: -45.0 }]
        );
        assert_eq!(
            mission.settings.heading_mode,
            VendorHeadingMode::UsingWaypointHeading
        );
        assert!(mission.settings.exit_mission_on_signal_lost);
        assert_eq!(mission.settings.flight_path_mode, VendorFlightPathMode::Curved);
    }

    #[test]
    fn enhanced_lowering_reports_action_indices() {
        let unknown: MissionAction =
            serde_json::from_value(serde_json::json!({ "type": "launchFireworks" })).unwrap();
        let doc = document(vec![
            MissionWaypoint::new(BASE, 40.0),
            MissionWaypoint::new(BASE, 40.0)
                .with_action(MissionAction::take_photo())
                .with_action(unknown),
        ]);
        match lower_enhanced(&doc, &VendorEnvelope::default()).unwrap_err() {
            TranslationError::InvalidAction {
                waypoint_index,
                action_index,
                reason,
            } => {
                assert_eq!((waypoint_index, action_index), (1, 1));
                assert_eq!(reason, "unknown action type 'launchFireworks'");
            }
            other => panic!("expected InvalidAction, got {other:?}"),
        }
    }

    #[test]
    fn recording_longer_than_vendor_stay_is_rejected() {
        let wp = MissionWaypoint::new(BASE, 40.0)
            .with_action(MissionAction::start_recording(Some(60.0)));
        let doc = document(vec![wp]);
        let err = lower_enhanced(&doc, &VendorEnvelope::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslationError::InvalidAction {
                waypoint_index: 0,
                action_index: 0,
                ..
            }
        ));
    }

    #[test]
    fn repeat_times_outside_vendor_envelope_is_a_mission_error() {
        let mut doc = document(vec![MissionWaypoint::new(BASE, 40.0)]);
        doc.settings.repeat_times = 300;
        let err = lower_enhanced(&doc, &VendorEnvelope::default()).unwrap_err();
        assert_eq!(
            err,
            TranslationError::InvalidVendorMission {
                waypoint_index: None,
                reason: "repeatTimes out of [1,255]".to_string(),
            }
        );
    }

    #[test]
    fn too_many_vendor_actions_on_one_waypoint() {
        let mut wp = MissionWaypoint::new(BASE, 40.0);
        for _ in 0..6 {
            wp = wp.with_action(MissionAction::start_recording(Some(1.0)));
        }
        let err = lower_enhanced(&document(vec![wp]), &VendorEnvelope::default()).unwrap_err();
        match err {
            TranslationError::InvalidWaypoint { index, reason } => {
                assert_eq!(index, 0);
                assert!(reason.starts_with("18 vendor actions"), "reason was {reason}");
            }
            other => panic!("expected InvalidWaypoint, got {other:?}"),
        }
    }
}
