//! Independent checks on a canonical Flight Plan.
//!
//! Plans can be built directly by templates or callers without going
//! through a document, so this layer does not trust its input.
//! Order: waypoint count, each waypoint (coordinate, altitude, heading,
//! gimbal pitch), speeds, then segment lengths.

use crate::error::{Stage, ValidationError};
use crate::flight_plan::FlightPlan;
use crate::rules::FlightPlanEnvelope;

pub fn validate_flight_plan(
    plan: &FlightPlan,
    env: &FlightPlanEnvelope,
) -> Result<(), ValidationError> {
    let result = check_plan(plan, env);
    match &result {
        Ok(()) => tracing::debug!(
            waypoints = plan.waypoints.len(),
            distance_m = plan.total_distance_m(),
            "flight plan passed validation"
        ),
        Err(err) => tracing::debug!(field = err.field, "flight plan rejected: {}", err),
    }
    result
}

fn check_plan(plan: &FlightPlan, env: &FlightPlanEnvelope) -> Result<(), ValidationError> {
    let stage = Stage::FlightPlan;
    let count = plan.waypoints.len();
    if !env.waypoint_count.contains_len(count) {
        return Err(ValidationError::new(
            stage,
            "waypoints",
            format!("waypoint count {count} out of {}", env.waypoint_count),
        ));
    }

    for (index, wp) in plan.waypoints.iter().enumerate() {
        if !wp.coordinate.is_valid() {
            return Err(ValidationError::new(
                stage,
                "coordinate",
                format!(
                    "coordinate ({}, {}) outside [-90,90] x [-180,180]",
                    wp.coordinate.lat, wp.coordinate.lon
                ),
            )
            .at_waypoint(index));
        }
        if !env.altitude_m.contains(wp.altitude_m) {
            return Err(
                ValidationError::out_of_range(stage, "altitude", env.altitude_m).at_waypoint(index),
            );
        }
        if let Some(heading) = wp.heading_deg {
            if !env.heading_deg.contains(heading) {
                return Err(ValidationError::out_of_range(stage, "heading", env.heading_deg)
                    .at_waypoint(index));
            }
        }
        if let Some(pitch) = wp.gimbal_pitch_deg {
            if !env.gimbal_pitch_deg.contains(pitch) {
                return Err(
                    ValidationError::out_of_range(stage, "gimbalPitch", env.gimbal_pitch_deg)
                        .at_waypoint(index),
                );
            }
        }
    }

    if !env.max_speed_mps.contains(plan.max_speed_mps) {
        return Err(ValidationError::out_of_range(
            stage,
            "maxSpeed",
            env.max_speed_mps,
        ));
    }
    let auto_range = env.max_speed_mps.with_max(plan.max_speed_mps);
    if !auto_range.contains(plan.auto_speed_mps) {
        return Err(ValidationError::out_of_range(stage, "autoSpeed", auto_range));
    }

    for (index, pair) in plan.waypoints.windows(2).enumerate() {
        let distance_m = pair[0].coordinate.distance_to(&pair[1].coordinate);
        if distance_m > env.max_segment_distance_m {
            return Err(ValidationError::new(
                stage,
                "distance",
                format!(
                    "segment length {:.1} m exceeds {} m",
                    distance_m, env.max_segment_distance_m
                ),
            )
            .between(index, index + 1));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight_plan::{FinishAction, FlightPlanWaypoint, HeadingMode};
    use crate::geometry::{offset_position, Coordinate};

    const BASE: Coordinate = Coordinate {
        lat: 33.6846,
        lon: -117.8265,
    };

    fn plan(points: Vec<FlightPlanWaypoint>) -> FlightPlan {
        FlightPlan {
            waypoints: points,
            max_speed_mps: 12.0,
            auto_speed_mps: 6.0,
            finished_action: FinishAction::GoHome,
            heading_mode: HeadingMode::Auto,
        }
    }

    fn line(spacing_m: &[f64]) -> FlightPlan {
        let mut points = vec![FlightPlanWaypoint::new(BASE, 40.0)];
        let mut north = 0.0;
        for step in spacing_m {
            north += step;
            points.push(FlightPlanWaypoint::new(
                offset_position(&BASE, north, 0.0),
                40.0,
            ));
        }
        plan(points)
    }

    #[test]
    fn single_waypoint_plan_rejected() {
        let err = validate_flight_plan(&line(&[]), &FlightPlanEnvelope::default()).unwrap_err();
        assert_eq!(err.reason, "waypoint count 1 out of [2,99]");
    }

    #[test]
    fn segment_limit_is_per_segment() {
        let env = FlightPlanEnvelope::default();
        assert!(validate_flight_plan(&line(&[999.0, 999.0, 999.0]), &env).is_ok());

        let err = validate_flight_plan(&line(&[500.0, 1200.0]), &env).unwrap_err();
        assert_eq!(err.stage, Stage::FlightPlan);
        assert_eq!(err.segment, Some((1, 2)));
        assert_eq!(err.waypoint_index, Some(1));
    }

    #[test]
    fn speed_ordering_enforced() {
        let env = FlightPlanEnvelope::default();
        let mut p = line(&[100.0]);
        p.max_speed_mps = 20.0;
        let err = validate_flight_plan(&p, &env).unwrap_err();
        assert_eq!(err.reason, "maxSpeed out of (0,15]");

        p.max_speed_mps = 8.0;
        p.auto_speed_mps = 9.0;
        let err = validate_flight_plan(&p, &env).unwrap_err();
        assert_eq!(err.reason, "autoSpeed out of (0,8]");

        p.auto_speed_mps = 0.0;
        assert_eq!(
            validate_flight_plan(&p, &env).unwrap_err().field,
            "autoSpeed"
        );
    }

    #[test]
    fn waypoint_orientation_checked() {
        let env = FlightPlanEnvelope::default();
        let mut p = line(&[100.0]);
        p.waypoints[1].gimbal_pitch_deg = Some(-120.0);
        let err = validate_flight_plan(&p, &env).unwrap_err();
        assert_eq!(err.field, "gimbalPitch");
        assert_eq!(err.waypoint_index, Some(1));

        p.waypoints[1].gimbal_pitch_deg = None;
        p.waypoints[0].heading_deg = Some(-1.0);
        assert_eq!(validate_flight_plan(&p, &env).unwrap_err().field, "heading");
    }

    #[test]
    fn non_finite_altitude_rejected() {
        let mut p = line(&[100.0]);
        p.waypoints[0].altitude_m = f64::NAN;
        let err = validate_flight_plan(&p, &FlightPlanEnvelope::default()).unwrap_err();
        assert_eq!(err.field, "altitude");
    }
}
