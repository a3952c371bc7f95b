//! Final gate before a Vendor Mission is handed to the upload collaborator.
//!
//! Re-checks the lowered structure against the controller envelope, whatever
//! produced it.

use crate::error::TranslationError;
use crate::rules::VendorEnvelope;
use crate::vendor::{VendorAction, VendorMission, VendorWaypoint};

pub fn validate_vendor_mission(
    mission: &VendorMission,
    env: &VendorEnvelope,
) -> Result<(), TranslationError> {
    let count = mission.waypoints.len();
    if !env.waypoint_count.contains_len(count) {
        return Err(TranslationError::vendor(format!(
            "waypoint count {count} out of {}",
            env.waypoint_count
        )));
    }

    let settings = &mission.settings;
    if !env.max_speed_mps.contains(settings.max_flight_speed) {
        return Err(TranslationError::vendor(format!(
            "maxFlightSpeed out of {}",
            env.max_speed_mps
        )));
    }
    let auto_floor = env.min_auto_speed_mps;
    if !settings.auto_flight_speed.is_finite()
        || settings.auto_flight_speed < auto_floor
        || settings.auto_flight_speed > settings.max_flight_speed
    {
        return Err(TranslationError::vendor(format!(
            "autoFlightSpeed out of [{auto_floor},{}]",
            settings.max_flight_speed
        )));
    }
    if !env.repeat_times.contains(settings.repeat_times) {
        return Err(TranslationError::vendor(format!(
            "repeatTimes out of {}",
            env.repeat_times
        )));
    }

    for (index, wp) in mission.waypoints.iter().enumerate() {
        check_waypoint(wp, env)
            .map_err(|reason| TranslationError::vendor_waypoint(index, reason))?;
    }

    tracing::debug!(
        waypoints = count,
        actions = mission.action_count(),
        "vendor mission ready for upload"
    );
    Ok(())
}

fn check_waypoint(wp: &VendorWaypoint, env: &VendorEnvelope) -> Result<(), String> {
    if !wp.coordinate.is_valid() {
        return Err(format!(
            "coordinate ({}, {}) outside [-90,90] x [-180,180]",
            wp.coordinate.lat, wp.coordinate.lon
        ));
    }
    if !env.altitude_m.contains(wp.altitude_m) {
        return Err(format!("altitude out of {}", env.altitude_m));
    }
    if !env.heading_deg.contains(wp.heading_deg) {
        return Err(format!("heading out of {}", env.heading_deg));
    }
    if !env.corner_radius_m.contains(wp.corner_radius_m) {
        return Err(format!("cornerRadius out of {}", env.corner_radius_m));
    }
    if let Some(speed) = wp.speed_mps {
        if !env.waypoint_speed_mps.contains(speed) {
            return Err(format!("speed out of {}", env.waypoint_speed_mps));
        }
    }
    if !env.action_timeout_s.contains(wp.action_timeout_seconds) {
        return Err(format!("actionTimeoutSeconds out of {}", env.action_timeout_s));
    }
    if !env.action_repeat_times.contains(wp.action_repeat_times) {
        return Err(format!("actionRepeatTimes out of {}", env.action_repeat_times));
    }
    if wp.actions.len() > env.max_actions_per_waypoint {
        return Err(format!(
            "{} actions exceed the limit of {}",
            wp.actions.len(),
            env.max_actions_per_waypoint
        ));
    }

    for (action_index, action) in wp.actions.iter().enumerate() {
        match *action {
            VendorAction::RotateGimbalPitch { pitch } if !env.gimbal_pitch_deg.contains(pitch) => {
                return Err(format!(
                    "action {action_index}: pitch out of {}",
                    env.gimbal_pitch_deg
                ));
            }
            VendorAction::RotateAircraft { heading } if !env.heading_deg.contains(heading) => {
                return Err(format!(
                    "action {action_index}: heading out of {}",
                    env.heading_deg
                ));
            }
            VendorAction::Stay { milliseconds } if milliseconds > env.max_stay_ms => {
                return Err(format!(
                    "action {action_index}: stay of {milliseconds} ms exceeds {} ms",
                    env.max_stay_ms
                ));
            }
            _ => {}
        }
    }
    Ok(())
}
