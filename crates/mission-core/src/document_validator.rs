//! Layered checks over a Mission Document.
//!
//! Check order is fixed: metadata, waypoint count, each waypoint in index
//! order (coordinate, altitude, gimbal pitch, heading, speed, corner radius,
//! action repeat/timeout, actions), settings, the safety-limit block, and
//! finally the safety-limit envelope applied to the waypoints.
//! [`validate_document`] stops at the first violation;
//! [`collect_document_violations`] runs the same checks to completion.

use crate::document::{ActionCommand, MissionDocument, MissionWaypoint, SafetyLimits};
use crate::error::{Stage, ValidationError};
use crate::rules::{DocumentEnvelope, PipelineRules, SafetyEnvelope, ValueRange};
use std::ops::ControlFlow;

/// Return the first violation in check order, or `Ok(())`.
pub fn validate_document(
    doc: &MissionDocument,
    rules: &PipelineRules,
) -> Result<(), ValidationError> {
    let mut sink = Violations::fail_fast();
    let _ = run_checks(doc, rules, &mut sink);
    match sink.found.into_iter().next() {
        Some(err) => {
            tracing::debug!(
                stage = %err.stage,
                field = err.field,
                "mission document rejected: {}",
                err
            );
            Err(err)
        }
        None => {
            tracing::debug!(
                name = %doc.metadata.name,
                waypoints = doc.waypoints.len(),
                "mission document passed validation"
            );
            Ok(())
        }
    }
}

/// Every violation, in the same order [`validate_document`] would find them.
pub fn collect_document_violations(
    doc: &MissionDocument,
    rules: &PipelineRules,
) -> Vec<ValidationError> {
    let mut sink = Violations::collect_all();
    let _ = run_checks(doc, rules, &mut sink);
    sink.found
}

struct Violations {
    fail_fast: bool,
    found: Vec<ValidationError>,
}

impl Violations {
    fn fail_fast() -> Self {
        Self {
            fail_fast: true,
            found: Vec::new(),
        }
    }

    fn collect_all() -> Self {
        Self {
            fail_fast: false,
            found: Vec::new(),
        }
    }

    fn report(&mut self, err: ValidationError) -> ControlFlow<()> {
        self.found.push(err);
        if self.fail_fast {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    /// Report `err()` unless `ok` holds.
    fn check(&mut self, ok: bool, err: impl FnOnce() -> ValidationError) -> ControlFlow<()> {
        if ok {
            ControlFlow::Continue(())
        } else {
            self.report(err())
        }
    }
}

fn run_checks(
    doc: &MissionDocument,
    rules: &PipelineRules,
    sink: &mut Violations,
) -> ControlFlow<()> {
    check_metadata(doc, &rules.document, sink)?;

    let count = doc.waypoints.len();
    let count_range = rules.document.waypoint_count;
    sink.check(count_range.contains_len(count), || {
        ValidationError::new(
            Stage::Waypoints,
            "waypoints",
            format!("waypoint count {count} out of {count_range}"),
        )
    })?;

    for (index, waypoint) in doc.waypoints.iter().enumerate() {
        check_waypoint(index, waypoint, &rules.document, sink)?;
    }

    check_settings(doc, &rules.document, sink)?;
    check_safety_block(&doc.safety_limits, &rules.safety, sink)?;
    check_safety_envelope(doc, sink)
}

fn check_metadata(
    doc: &MissionDocument,
    env: &DocumentEnvelope,
    sink: &mut Violations,
) -> ControlFlow<()> {
    let meta = &doc.metadata;
    sink.check(!meta.name.trim().is_empty(), || {
        ValidationError::new(Stage::Metadata, "name", "name must not be empty")
    })?;
    sink.check(
        env.supported_schema_versions
            .iter()
            .any(|v| v == &meta.schema_version),
        || {
            ValidationError::new(
                Stage::Metadata,
                "schemaVersion",
                format!("unsupported schemaVersion '{}'", meta.schema_version),
            )
        },
    )?;
    sink.check(meta.modified_at >= meta.created_at, || {
        ValidationError::new(
            Stage::Metadata,
            "modifiedAt",
            "modifiedAt precedes createdAt",
        )
    })
}

fn check_optional(
    value: Option<f64>,
    range: ValueRange,
    stage: Stage,
    field: &'static str,
    index: usize,
    sink: &mut Violations,
) -> ControlFlow<()> {
    match value {
        Some(v) => sink.check(range.contains(v), || {
            ValidationError::out_of_range(stage, field, range).at_waypoint(index)
        }),
        None => ControlFlow::Continue(()),
    }
}

fn check_waypoint(
    index: usize,
    wp: &MissionWaypoint,
    env: &DocumentEnvelope,
    sink: &mut Violations,
) -> ControlFlow<()> {
    let stage = Stage::Waypoints;
    sink.check(wp.coordinate.is_valid(), || {
        ValidationError::new(
            stage,
            "coordinate",
            format!(
                "coordinate ({}, {}) outside [-90,90] x [-180,180]",
                wp.coordinate.lat, wp.coordinate.lon
            ),
        )
        .at_waypoint(index)
    })?;
    sink.check(env.altitude_m.contains(wp.altitude_m), || {
        ValidationError::out_of_range(stage, "altitude", env.altitude_m).at_waypoint(index)
    })?;
    check_optional(
        wp.gimbal_pitch_deg,
        env.gimbal_pitch_deg,
        stage,
        "gimbalPitch",
        index,
        sink,
    )?;
    check_optional(wp.heading_deg, env.heading_deg, stage, "heading", index, sink)?;
    check_optional(wp.speed_mps, env.waypoint_speed_mps, stage, "speed", index, sink)?;
    sink.check(env.corner_radius_m.contains(wp.corner_radius_m), || {
        ValidationError::out_of_range(stage, "cornerRadius", env.corner_radius_m)
            .at_waypoint(index)
    })?;
    sink.check(env.action_repeat_times.contains(wp.action_repeat_times), || {
        ValidationError::out_of_range(stage, "actionRepeatTimes", env.action_repeat_times)
            .at_waypoint(index)
    })?;
    sink.check(env.action_timeout_s.contains(wp.action_timeout_seconds), || {
        ValidationError::out_of_range(stage, "actionTimeoutSeconds", env.action_timeout_s)
            .at_waypoint(index)
    })?;

    for (action_index, action) in wp.actions.iter().enumerate() {
        let located = |err: ValidationError| err.at_waypoint(index).at_action(action_index);
        let command = match action.resolve() {
            Ok(command) => command,
            Err(issue) => {
                sink.report(located(ValidationError::new(
                    stage,
                    "actions",
                    issue.to_string(),
                )))?;
                continue;
            }
        };
        match command {
            ActionCommand::RotateGimbal { pitch_deg } => {
                sink.check(env.gimbal_pitch_deg.contains(pitch_deg), || {
                    located(ValidationError::out_of_range(stage, "pitch", env.gimbal_pitch_deg))
                })?;
            }
            ActionCommand::RotateAircraft { heading_deg } => {
                sink.check(env.heading_deg.contains(heading_deg), || {
                    located(ValidationError::out_of_range(stage, "heading", env.heading_deg))
                })?;
            }
            ActionCommand::StartRecording {
                duration_s: Some(duration_s),
            } => {
                sink.check(env.recording_duration_s.contains(duration_s), || {
                    located(ValidationError::out_of_range(
                        stage,
                        "durationSeconds",
                        env.recording_duration_s,
                    ))
                })?;
            }
            ActionCommand::TakePhoto
            | ActionCommand::StopRecording
            | ActionCommand::StartRecording { duration_s: None } => {}
        }
    }

    ControlFlow::Continue(())
}

fn check_settings(
    doc: &MissionDocument,
    env: &DocumentEnvelope,
    sink: &mut Violations,
) -> ControlFlow<()> {
    let settings = &doc.settings;
    let stage = Stage::Settings;
    sink.check(env.max_speed_mps.contains(settings.max_speed_mps), || {
        ValidationError::out_of_range(stage, "maxFlightSpeed", env.max_speed_mps)
    })?;
    let auto_range = ValueRange::inclusive(env.min_auto_speed_mps, settings.max_speed_mps);
    sink.check(auto_range.contains(settings.auto_speed_mps), || {
        ValidationError::out_of_range(stage, "autoFlightSpeed", auto_range)
    })?;
    sink.check(env.repeat_times.contains(settings.repeat_times), || {
        ValidationError::out_of_range(stage, "repeatTimes", env.repeat_times)
    })
}

fn check_safety_block(
    limits: &SafetyLimits,
    env: &SafetyEnvelope,
    sink: &mut Violations,
) -> ControlFlow<()> {
    let stage = Stage::SafetyLimits;
    sink.check(env.max_altitude_m.contains(limits.max_altitude_m), || {
        ValidationError::out_of_range(stage, "maxAltitude", env.max_altitude_m)
    })?;
    sink.check(
        env.max_distance_from_home_m
            .contains(limits.max_distance_from_home_m),
        || {
            ValidationError::out_of_range(
                stage,
                "maxDistanceFromHome",
                env.max_distance_from_home_m,
            )
        },
    )?;
    sink.check(
        env.min_battery_percent.contains(limits.min_battery_percent),
        || ValidationError::out_of_range(stage, "minBatteryPercent", env.min_battery_percent),
    )?;
    sink.check(env.min_gps_level.contains(limits.min_gps_level), || {
        ValidationError::out_of_range(stage, "minGPSLevel", env.min_gps_level)
    })?;

    match (limits.geofence_center, limits.geofence_radius_m) {
        (Some(center), Some(radius_m)) => {
            sink.check(center.is_valid(), || {
                ValidationError::new(
                    stage,
                    "geofenceCenter",
                    "geofenceCenter outside [-90,90] x [-180,180]",
                )
            })?;
            sink.check(env.geofence_radius_m.contains(radius_m), || {
                ValidationError::out_of_range(stage, "geofenceRadius", env.geofence_radius_m)
            })
        }
        (Some(_), None) => sink.report(ValidationError::new(
            stage,
            "geofenceRadius",
            "geofenceCenter requires geofenceRadius",
        )),
        (None, Some(_)) => sink.report(ValidationError::new(
            stage,
            "geofenceCenter",
            "geofenceRadius requires geofenceCenter",
        )),
        (None, None) => ControlFlow::Continue(()),
    }
}

/// Apply the document's own safety limits to its waypoints.
fn check_safety_envelope(doc: &MissionDocument, sink: &mut Violations) -> ControlFlow<()> {
    let limits = &doc.safety_limits;
    let stage = Stage::SafetyLimits;

    for (index, wp) in doc.waypoints.iter().enumerate() {
        sink.check(wp.altitude_m <= limits.max_altitude_m, || {
            ValidationError::new(
                stage,
                "altitude",
                format!(
                    "altitude {} exceeds maxAltitude {}",
                    wp.altitude_m, limits.max_altitude_m
                ),
            )
            .at_waypoint(index)
        })?;
    }

    for (index, pair) in doc.waypoints.windows(2).enumerate() {
        let (from, to) = (&pair[0].coordinate, &pair[1].coordinate);
        if !from.is_valid() || !to.is_valid() {
            continue;
        }
        let distance_m = from.distance_to(to);
        sink.check(distance_m <= limits.max_distance_from_home_m, || {
            ValidationError::new(
                stage,
                "maxDistanceFromHome",
                format!(
                    "segment length {:.1} m exceeds maxDistanceFromHome {} m",
                    distance_m, limits.max_distance_from_home_m
                ),
            )
            .between(index, index + 1)
        })?;
    }

    if let (Some(center), Some(radius_m)) = (limits.geofence_center, limits.geofence_radius_m) {
        for (index, wp) in doc.waypoints.iter().enumerate() {
            if !wp.coordinate.is_valid() {
                continue;
            }
            let offset_m = center.distance_to(&wp.coordinate);
            sink.check(offset_m <= radius_m, || {
                ValidationError::new(
                    stage,
                    "geofenceRadius",
                    format!(
                        "waypoint lies {:.1} m from geofence center, radius is {} m",
                        offset_m, radius_m
                    ),
                )
                .at_waypoint(index)
            })?;
        }
    }

    ControlFlow::Continue(())
}
