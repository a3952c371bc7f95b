//! End-to-end tests driving the public pipeline.

use mission_core::geometry::{offset_position, path_length};
use mission_core::{
    canonicalize, Coordinate, ImportError, MissionPipeline, Stage, TemplateBase, TemplateKind,
    TranslationError, VendorAction,
};
use serde_json::{json, Value};

const FIELD: Coordinate = Coordinate {
    lat: 10.32352,
    lon: -84.430511,
};

fn waypoint_json(coordinate: Coordinate, altitude: f64) -> Value {
    json!({
        "coordinate": { "lat": coordinate.lat, "lon": coordinate.lon },
        "altitude": altitude
    })
}

fn mission_json(waypoints: Vec<Value>) -> Value {
    json!({
        "metadata": {
            "name": "Field survey",
            "author": "ops",
            "tags": [],
            "createdAt": "2024-06-01T08:00:00Z",
            "modifiedAt": "2024-06-01T08:00:00Z",
            "schemaVersion": "1.0"
        },
        "settings": {
            "maxFlightSpeed": 10.0,
            "autoFlightSpeed": 5.0,
            "finishedAction": "goHome",
            "headingMode": "auto"
        },
        "waypoints": waypoints,
        "safetyLimits": {
            "maxAltitude": 150.0,
            "maxDistanceFromHome": 2000.0,
            "minBatteryPercent": 25.0,
            "minGPSLevel": 4
        }
    })
}

fn bytes(value: &Value) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}

#[test]
fn test_malformed_json_is_not_a_validation_error() {
    let err = MissionPipeline::default()
        .import_document(b"{ not json")
        .unwrap_err();
    assert!(matches!(err, ImportError::MalformedInput(_)));
    assert!(err.validation().is_none());
}

#[test]
fn test_fail_fast_reports_metadata_first() {
    let mut doc = mission_json(vec![]);
    doc["metadata"]["name"] = json!("  ");
    let err = MissionPipeline::default()
        .import_document(&bytes(&doc))
        .unwrap_err();
    let violation = err.validation().expect("validation failure");
    assert_eq!(violation.stage, Stage::Metadata);
    assert_eq!(violation.field, "name");
}

#[test]
fn test_collect_mode_sees_past_first_violation() {
    let mut value = mission_json(vec![]);
    value["metadata"]["name"] = json!("");
    let pipeline = MissionPipeline::default();
    let doc = pipeline.parse_document(&bytes(&value)).unwrap();
    let fields: Vec<_> = pipeline
        .collect_violations(&doc)
        .iter()
        .map(|v| v.field)
        .collect();
    assert_eq!(fields, vec!["name", "waypoints"]);
}

#[test]
fn test_altitude_valid_for_document_but_not_vendor() {
    let pipeline = MissionPipeline::default();
    let doc = mission_json(vec![
        waypoint_json(FIELD, 140.0),
        waypoint_json(offset_position(&FIELD, 100.0, 0.0), 140.0),
    ]);
    let plan = pipeline
        .import_document(&bytes(&doc))
        .expect("140 m is inside the 150 m safety limit");

    match pipeline.translate(&plan).unwrap_err() {
        TranslationError::InvalidWaypoint { index, .. } => assert_eq!(index, 0),
        other => panic!("expected InvalidWaypoint, got {other:?}"),
    }
}

#[test]
fn test_segment_rule_names_both_waypoints() {
    let pipeline = MissionPipeline::default();

    let near = mission_json(vec![
        waypoint_json(FIELD, 40.0),
        waypoint_json(offset_position(&FIELD, 999.0, 0.0), 40.0),
    ]);
    assert!(pipeline.import_document(&bytes(&near)).is_ok());

    let far = mission_json(vec![
        waypoint_json(FIELD, 40.0),
        waypoint_json(offset_position(&FIELD, 1200.0, 0.0), 40.0),
    ]);
    let err = pipeline.import_document(&bytes(&far)).unwrap_err();
    let violation = err.validation().expect("validation failure");
    assert_eq!(violation.stage, Stage::FlightPlan);
    assert_eq!(violation.segment, Some((0, 1)));
    assert!(violation.reason.contains("1200"), "{}", violation.reason);
}

#[test]
fn test_export_round_trips_through_import() {
    let pipeline = MissionPipeline::default();
    let doc = mission_json(vec![
        waypoint_json(FIELD, 40.0),
        waypoint_json(offset_position(&FIELD, 300.0, 120.0), 60.0),
        waypoint_json(offset_position(&FIELD, 500.0, -80.0), 45.0),
    ]);
    let plan = pipeline.import_document(&bytes(&doc)).unwrap();

    let exported = pipeline
        .export_document(&plan, "Re-export", None, &[])
        .unwrap();
    let reimported = pipeline
        .import_document(&pipeline.document_to_json(&exported).unwrap())
        .unwrap();

    for (a, b) in plan.waypoints.iter().zip(&reimported.waypoints) {
        assert!((a.coordinate.lat - b.coordinate.lat).abs() < 1e-6);
        assert!((a.coordinate.lon - b.coordinate.lon).abs() < 1e-6);
        assert!((a.altitude_m - b.altitude_m).abs() < 0.01);
    }
    assert_eq!(canonicalize(&exported), plan);
}

#[test]
fn test_export_above_default_safety_altitude_reimports() {
    let pipeline = MissionPipeline::default();
    let doc = mission_json(vec![
        waypoint_json(FIELD, 140.0),
        waypoint_json(offset_position(&FIELD, 100.0, 0.0), 140.0),
    ]);
    let plan = pipeline.import_document(&bytes(&doc)).unwrap();

    let exported = pipeline
        .export_document(&plan, "High survey", None, &[])
        .unwrap();
    assert!(exported.safety_limits.max_altitude_m >= 140.0);
    assert!(exported.safety_limits.max_altitude_m <= 150.0);

    let reimported = pipeline
        .import_document(&pipeline.document_to_json(&exported).unwrap())
        .expect("exported document must import again");
    assert_eq!(reimported.waypoints.len(), 2);
    assert_eq!(canonicalize(&exported), plan);
}

#[test]
fn test_scenario_basic_template_translates_to_photo_square() {
    let pipeline = MissionPipeline::default();
    let built = pipeline
        .build_template(&TemplateKind::BasicTest {
            base: TemplateBase::Coordinate(FIELD),
            delta_deg: 0.001,
            altitude_m: Some(30.0),
        })
        .unwrap();

    let mission = pipeline.translate(&built.plan).unwrap();
    assert_eq!(mission.waypoints.len(), 4);
    for wp in &mission.waypoints {
        assert_eq!(wp.actions, vec![VendorAction::ShootPhoto]);
    }
    assert_eq!(mission.waypoints[0].coordinate, FIELD);

    let summary = pipeline.summarize(&built.plan);
    assert_eq!(summary.waypoint_count, 4);
    let expected = path_length(built.plan.coordinates());
    assert!((summary.total_distance_m - expected).abs() < 1e-9);
}

#[test]
fn test_scenario_grid_corners_record_after_enhanced_lowering() {
    let pipeline = MissionPipeline::default();
    let built = pipeline
        .build_template(&TemplateKind::GridSurvey {
            origin: TemplateBase::Location("costa-rica-field".to_string()),
            rows: 3,
            columns: 3,
            spacing_m: 30.0,
            altitude_m: Some(50.0),
        })
        .unwrap();

    let mission = pipeline.translate_enhanced(&built.document).unwrap();
    for (index, wp) in mission.waypoints.iter().enumerate() {
        assert_eq!(wp.actions[0], VendorAction::RotateGimbalPitch { pitch: -90.0 });
        assert_eq!(wp.actions[1], VendorAction::ShootPhoto);
        let records = wp.actions.contains(&VendorAction::StartRecord);
        assert_eq!(records, [0, 2, 6, 8].contains(&index), "waypoint {index}");
    }
}

#[test]
fn test_scenario_perimeter_geofence_radius() {
    let corners = vec![
        offset_position(&FIELD, 50.0, -50.0),
        offset_position(&FIELD, 50.0, 50.0),
        offset_position(&FIELD, -50.0, 50.0),
        offset_position(&FIELD, -50.0, -50.0),
    ];
    let built = MissionPipeline::default()
        .build_template(&TemplateKind::Perimeter {
            corners,
            altitude_m: 40.0,
        })
        .unwrap();

    let limits = &built.document.safety_limits;
    let radius = limits.geofence_radius_m.expect("geofence radius");
    assert!((radius - (2f64.sqrt() * 50.0 + 150.0)).abs() < 0.5, "radius {radius}");
    let center = limits.geofence_center.expect("geofence center");
    assert!(center.distance_to(&FIELD) < 0.5);
}

#[test]
fn test_scenario_excessive_max_speed_rejected_in_settings() {
    let mut doc = mission_json(vec![
        waypoint_json(FIELD, 40.0),
        waypoint_json(offset_position(&FIELD, 100.0, 0.0), 40.0),
    ]);
    doc["settings"]["maxFlightSpeed"] = json!(30.0);

    let err = MissionPipeline::default()
        .import_document(&bytes(&doc))
        .unwrap_err();
    let violation = err.validation().expect("validation failure");
    assert_eq!(violation.stage, Stage::Settings);
    assert_eq!(violation.reason, "maxFlightSpeed out of [1,25]");
}
