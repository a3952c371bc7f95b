//! Mission template builders: basic square, boustrophedon grid survey and
//! perimeter inspection.
//!
//! Builders only lay out geometry and intent. They return a document that
//! still has to go through validation like any imported one.

use crate::document::{
    DocumentHeadingMode, FinishedAction, MissionAction, MissionDocument, MissionMetadata,
    MissionSettings, MissionWaypoint, SafetyLimits,
};
use crate::error::TemplateError;
use crate::geometry::{bearing_deg, centroid, offset_position, Coordinate};
use crate::locations::TestLocations;

pub const DEFAULT_TEMPLATE_ALTITUDE_M: f64 = 30.0;
pub const MAX_TEMPLATE_WAYPOINTS: usize = 99;
pub const GRID_GIMBAL_PITCH_DEG: f64 = -90.0;
pub const PERIMETER_GIMBAL_PITCH_DEG: f64 = -30.0;
/// Added to the farthest corner distance when sizing the perimeter geofence.
pub const GEOFENCE_BUFFER_M: f64 = 150.0;
/// Clip length recorded at each grid corner.
pub const CORNER_RECORDING_S: f64 = 5.0;

/// Template origin: explicit coordinate or a named test site.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateBase {
    Coordinate(Coordinate),
    Location(String),
}

impl From<Coordinate> for TemplateBase {
    fn from(coordinate: Coordinate) -> Self {
        Self::Coordinate(coordinate)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateKind {
    BasicTest {
        base: TemplateBase,
        delta_deg: f64,
        altitude_m: Option<f64>,
    },
    GridSurvey {
        origin: TemplateBase,
        rows: usize,
        columns: usize,
        spacing_m: f64,
        altitude_m: Option<f64>,
    },
    Perimeter {
        corners: Vec<Coordinate>,
        altitude_m: f64,
    },
}

impl TemplateKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BasicTest { .. } => "basic",
            Self::GridSurvey { .. } => "grid",
            Self::Perimeter { .. } => "perimeter",
        }
    }
}

/// Resolve the origin and altitude, then run the matching builder.
pub fn build(
    kind: &TemplateKind,
    locations: &TestLocations,
    author: &str,
) -> Result<MissionDocument, TemplateError> {
    match kind {
        TemplateKind::BasicTest {
            base,
            delta_deg,
            altitude_m,
        } => {
            let (base, default_alt) = resolve_base(base, locations)?;
            basic_test(base, *delta_deg, altitude_m.unwrap_or(default_alt), author)
        }
        TemplateKind::GridSurvey {
            origin,
            rows,
            columns,
            spacing_m,
            altitude_m,
        } => {
            let (origin, default_alt) = resolve_base(origin, locations)?;
            grid_survey(
                origin,
                *rows,
                *columns,
                *spacing_m,
                altitude_m.unwrap_or(default_alt),
                author,
            )
        }
        TemplateKind::Perimeter {
            corners,
            altitude_m,
        } => perimeter_inspection(corners, *altitude_m, author),
    }
}

fn resolve_base(
    base: &TemplateBase,
    locations: &TestLocations,
) -> Result<(Coordinate, f64), TemplateError> {
    match base {
        TemplateBase::Coordinate(coordinate) => Ok((*coordinate, DEFAULT_TEMPLATE_ALTITUDE_M)),
        TemplateBase::Location(name) => {
            let site = locations.resolve(name)?;
            Ok((site.coordinate, site.default_altitude_m))
        }
    }
}

/// Four-corner square of side `delta_deg`, flown counter-clockwise from `base`.
pub fn basic_test(
    base: Coordinate,
    delta_deg: f64,
    altitude_m: f64,
    author: &str,
) -> Result<MissionDocument, TemplateError> {
    check_origin(&base)?;
    check_positive("delta", delta_deg)?;
    check_altitude(altitude_m)?;

    let corners = [
        base,
        Coordinate::new(base.lat + delta_deg, base.lon),
        Coordinate::new(base.lat + delta_deg, base.lon + delta_deg),
        Coordinate::new(base.lat, base.lon + delta_deg),
    ];
    if let Some(bad) = corners.iter().find(|c| !c.is_valid()) {
        return Err(TemplateError::InvalidParameters(format!(
            "square corner ({}, {}) leaves the globe",
            bad.lat, bad.lon
        )));
    }

    let waypoints = corners
        .iter()
        .map(|c| MissionWaypoint::new(*c, altitude_m))
        .collect();
    Ok(document(
        "Basic Test",
        format!("Square of {delta_deg} degrees at {altitude_m} m"),
        &["template", "basic"],
        author,
        MissionSettings {
            finished_action: FinishedAction::GoHome,
            ..MissionSettings::default()
        },
        waypoints,
        SafetyLimits::default(),
    ))
}

/// Cell visiting order for a boustrophedon pass: even rows run west to
/// east, odd rows east to west.
pub fn boustrophedon_order(rows: usize, columns: usize) -> Vec<(usize, usize)> {
    (0..rows)
        .flat_map(|row| {
            let cols: Box<dyn Iterator<Item = usize>> = if row % 2 == 0 {
                Box::new(0..columns)
            } else {
                Box::new((0..columns).rev())
            };
            cols.map(move |col| (row, col))
        })
        .collect()
}

/// Lawnmower survey over a `rows` x `columns` grid spaced `spacing_m` apart.
///
/// Rows advance north and columns east from `origin`. The camera points
/// straight down and every cell takes a photo; the four corner cells also
/// record a short clip.
pub fn grid_survey(
    origin: Coordinate,
    rows: usize,
    columns: usize,
    spacing_m: f64,
    altitude_m: f64,
    author: &str,
) -> Result<MissionDocument, TemplateError> {
    check_origin(&origin)?;
    if rows == 0 || columns == 0 {
        return Err(TemplateError::InvalidParameters(format!(
            "grid needs at least one row and column, got {rows}x{columns}"
        )));
    }
    let cells = rows.checked_mul(columns).unwrap_or(usize::MAX);
    if cells > MAX_TEMPLATE_WAYPOINTS {
        return Err(TemplateError::InvalidParameters(format!(
            "grid of {rows}x{columns} exceeds {MAX_TEMPLATE_WAYPOINTS} waypoints"
        )));
    }
    check_positive("spacing", spacing_m)?;
    check_altitude(altitude_m)?;

    let is_corner = |row: usize, col: usize| {
        (row == 0 || row == rows - 1) && (col == 0 || col == columns - 1)
    };
    let waypoints = boustrophedon_order(rows, columns)
        .into_iter()
        .map(|(row, col)| {
            let position =
                offset_position(&origin, row as f64 * spacing_m, col as f64 * spacing_m);
            let wp = MissionWaypoint::new(position, altitude_m)
                .with_gimbal_pitch(GRID_GIMBAL_PITCH_DEG)
                .with_action(MissionAction::take_photo());
            if is_corner(row, col) {
                wp.with_action(MissionAction::start_recording(Some(CORNER_RECORDING_S)))
            } else {
                wp
            }
        })
        .collect();

    Ok(document(
        &format!("Grid Survey {rows}x{columns}"),
        format!("{rows}x{columns} grid at {spacing_m} m spacing, {altitude_m} m AGL"),
        &["template", "grid", "survey"],
        author,
        MissionSettings::default(),
        waypoints,
        SafetyLimits::default(),
    ))
}

/// One waypoint per corner, each facing the centroid, inside a geofence
/// sized to the farthest corner plus [`GEOFENCE_BUFFER_M`].
pub fn perimeter_inspection(
    corners: &[Coordinate],
    altitude_m: f64,
    author: &str,
) -> Result<MissionDocument, TemplateError> {
    if corners.len() < 3 {
        return Err(TemplateError::InvalidParameters(format!(
            "perimeter needs at least 3 corners, got {}",
            corners.len()
        )));
    }
    if corners.len() > MAX_TEMPLATE_WAYPOINTS {
        return Err(TemplateError::InvalidParameters(format!(
            "perimeter of {} corners exceeds {MAX_TEMPLATE_WAYPOINTS} waypoints",
            corners.len()
        )));
    }
    for corner in corners {
        check_origin(corner)?;
    }
    check_altitude(altitude_m)?;

    let center = centroid(corners).ok_or_else(|| {
        TemplateError::InvalidParameters("perimeter has no corners".to_string())
    })?;
    let farthest_m = corners
        .iter()
        .map(|c| center.distance_to(c))
        .fold(0.0, f64::max);

    let waypoints = corners
        .iter()
        .map(|corner| {
            MissionWaypoint::new(*corner, altitude_m)
                .with_heading(bearing_deg(corner, &center))
                .with_gimbal_pitch(PERIMETER_GIMBAL_PITCH_DEG)
                .with_action(MissionAction::take_photo())
        })
        .collect();

    Ok(document(
        "Perimeter Inspection",
        format!("{} corners at {altitude_m} m", corners.len()),
        &["template", "perimeter", "inspection"],
        author,
        MissionSettings {
            heading_mode: DocumentHeadingMode::WaypointHeading,
            ..MissionSettings::default()
        },
        waypoints,
        SafetyLimits {
            geofence_center: Some(center),
            geofence_radius_m: Some(farthest_m + GEOFENCE_BUFFER_M),
            ..SafetyLimits::default()
        },
    ))
}

fn document(
    name: &str,
    description: String,
    tags: &[&str],
    author: &str,
    settings: MissionSettings,
    waypoints: Vec<MissionWaypoint>,
    safety_limits: SafetyLimits,
) -> MissionDocument {
    let mut metadata = MissionMetadata::new(name, author);
    metadata.description = Some(description);
    metadata.tags = tags.iter().map(|t| t.to_string()).collect();
    MissionDocument {
        metadata,
        settings,
        waypoints,
        safety_limits,
    }
}

fn check_origin(coordinate: &Coordinate) -> Result<(), TemplateError> {
    if coordinate.is_valid() {
        Ok(())
    } else {
        Err(TemplateError::InvalidParameters(format!(
            "coordinate ({}, {}) outside [-90,90] x [-180,180]",
            coordinate.lat, coordinate.lon
        )))
    }
}

fn check_positive(what: &str, value: f64) -> Result<(), TemplateError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TemplateError::InvalidParameters(format!(
            "{what} must be positive, got {value}"
        )))
    }
}

fn check_altitude(altitude_m: f64) -> Result<(), TemplateError> {
    check_positive("altitude", altitude_m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ActionKind;

    const FIELD: Coordinate = Coordinate {
        lat: 10.32352,
        lon: -84.430511,
    };

    #[test]
    fn basic_square_layout() {
        let doc = basic_test(FIELD, 0.001, 30.0, "tester").unwrap();
        let coords: Vec<_> = doc.coordinates().copied().collect();
        assert_eq!(coords.len(), 4);
        assert_eq!(coords[0], FIELD);
        assert!((coords[1].lat - 10.32452).abs() < 1e-9);
        assert_eq!(coords[1].lon, FIELD.lon);
        assert!((coords[2].lon - -84.429511).abs() < 1e-9);
        assert_eq!(coords[3].lat, FIELD.lat);
        assert_eq!(doc.settings.finished_action, FinishedAction::GoHome);
        assert!(doc.waypoints.iter().all(|wp| wp.altitude_m == 30.0));
    }

    #[test]
    fn boustrophedon_snakes_rows() {
        assert_eq!(
            boustrophedon_order(3, 3),
            vec![
                (0, 0),
                (0, 1),
                (0, 2),
                (1, 2),
                (1, 1),
                (1, 0),
                (2, 0),
                (2, 1),
                (2, 2)
            ]
        );
        assert_eq!(boustrophedon_order(2, 1), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn grid_corners_also_record() {
        let doc = grid_survey(FIELD, 3, 3, 20.0, 40.0, "tester").unwrap();
        assert_eq!(doc.waypoints.len(), 9);
        for (index, wp) in doc.waypoints.iter().enumerate() {
            assert_eq!(wp.gimbal_pitch_deg, Some(GRID_GIMBAL_PITCH_DEG));
            assert_eq!(wp.actions[0].kind, ActionKind::TakePhoto);
            let records = wp
                .actions
                .iter()
                .any(|a| a.kind == ActionKind::StartRecording);
            assert_eq!(records, [0, 2, 6, 8].contains(&index), "waypoint {index}");
        }
        // Second row runs back west: waypoint 3 sits above waypoint 2.
        let above = doc.waypoints[3].coordinate;
        assert!((above.lon - doc.waypoints[2].coordinate.lon).abs() < 1e-7);
        assert!((doc.waypoints[2].coordinate.distance_to(&above) - 20.0).abs() < 0.01);
    }

    #[test]
    fn degenerate_grids_rejected() {
        assert!(grid_survey(FIELD, 0, 3, 20.0, 40.0, "t").is_err());
        assert!(grid_survey(FIELD, 10, 10, 20.0, 40.0, "t").is_err());
        assert!(grid_survey(FIELD, 3, 3, 0.0, 40.0, "t").is_err());
        assert!(basic_test(FIELD, -0.001, 30.0, "t").is_err());
    }

    #[test]
    fn perimeter_geofence_covers_corners() {
        let corners = [
            offset_position(&FIELD, 50.0, -50.0),
            offset_position(&FIELD, 50.0, 50.0),
            offset_position(&FIELD, -50.0, 50.0),
            offset_position(&FIELD, -50.0, -50.0),
        ];
        let doc = perimeter_inspection(&corners, 35.0, "tester").unwrap();
        let center = doc.safety_limits.geofence_center.unwrap();
        let expected = centroid(&corners).unwrap();
        assert_eq!(center, expected);

        let radius = doc.safety_limits.geofence_radius_m.unwrap();
        let expected_radius = 2f64.sqrt() * 50.0 + GEOFENCE_BUFFER_M;
        assert!((radius - expected_radius).abs() < 0.5, "radius {radius}");

        assert_eq!(doc.settings.heading_mode, DocumentHeadingMode::WaypointHeading);
        // North-west corner faces south-east.
        let heading = doc.waypoints[0].heading_deg.unwrap();
        assert!((heading - 135.0).abs() < 0.5, "heading {heading}");
        assert!(doc
            .waypoints
            .iter()
            .all(|wp| wp.gimbal_pitch_deg == Some(PERIMETER_GIMBAL_PITCH_DEG)));
    }

    #[test]
    fn perimeter_needs_three_corners() {
        let err = perimeter_inspection(&[FIELD, FIELD], 30.0, "t").unwrap_err();
        assert!(matches!(err, TemplateError::InvalidParameters(_)));
    }

    #[test]
    fn build_resolves_named_location() {
        let kind = TemplateKind::BasicTest {
            base: TemplateBase::Location(crate::locations::DEFAULT_LOCATION.to_string()),
            delta_deg: 0.001,
            altitude_m: None,
        };
        let doc = build(&kind, &TestLocations::default(), "tester").unwrap();
        assert_eq!(doc.waypoints[0].coordinate, FIELD);

        let unknown = TemplateKind::GridSurvey {
            origin: TemplateBase::Location("atlantis".to_string()),
            rows: 2,
            columns: 2,
            spacing_m: 10.0,
            altitude_m: Some(30.0),
        };
        assert_eq!(
            build(&unknown, &TestLocations::default(), "tester").unwrap_err(),
            TemplateError::UnknownLocation("atlantis".to_string())
        );
    }
}
