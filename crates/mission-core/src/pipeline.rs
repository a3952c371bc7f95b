//! The mission pipeline service: import, export, translate and templates.
//!
//! `MissionPipeline` is a plain value holding its rules and test sites. It
//! keeps no per-call state, so a single instance can be shared freely.

use crate::canonical::canonicalize;
use crate::document::{
    MissionDocument, MissionMetadata, MissionSettings, MissionWaypoint, SafetyLimits,
};
use crate::document_validator::{collect_document_violations, validate_document};
use crate::error::{ExportError, ImportError, TemplateError, TranslationError, ValidationError};
use crate::flight_plan::{FlightPlan, MissionSummary};
use crate::locations::TestLocations;
use crate::plan_validator::validate_flight_plan;
use crate::rules::PipelineRules;
use crate::templates::{self, TemplateKind};
use crate::translator::{lower_basic, lower_enhanced};
use crate::vendor::VendorMission;
use crate::vendor_validator::validate_vendor_mission;
use tracing::{debug, info};

pub const DEFAULT_AUTHOR: &str = "mission-pipeline";

/// A template document together with its canonical plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMission {
    pub document: MissionDocument,
    pub plan: FlightPlan,
}

#[derive(Debug, Clone)]
pub struct MissionPipeline {
    rules: PipelineRules,
    locations: TestLocations,
    default_author: String,
}

impl Default for MissionPipeline {
    fn default() -> Self {
        Self::new(PipelineRules::default())
    }
}

impl MissionPipeline {
    pub fn new(rules: PipelineRules) -> Self {
        Self {
            rules,
            locations: TestLocations::default(),
            default_author: DEFAULT_AUTHOR.to_string(),
        }
    }

    pub fn with_locations(mut self, locations: TestLocations) -> Self {
        self.locations = locations;
        self
    }

    pub fn with_default_author(mut self, author: impl Into<String>) -> Self {
        self.default_author = author.into();
        self
    }

    pub fn rules(&self) -> &PipelineRules {
        &self.rules
    }

    pub fn locations(&self) -> &TestLocations {
        &self.locations
    }

    pub fn default_author(&self) -> &str {
        &self.default_author
    }

    /// Parse a document without validating it.
    pub fn parse_document(&self, bytes: &[u8]) -> Result<MissionDocument, ImportError> {
        Ok(MissionDocument::from_json_slice(bytes)?)
    }

    /// Document checks followed by the safety-limit envelope.
    pub fn validate(&self, doc: &MissionDocument) -> Result<(), ValidationError> {
        validate_document(doc, &self.rules)
    }

    /// Every document violation rather than only the first.
    pub fn collect_violations(&self, doc: &MissionDocument) -> Vec<ValidationError> {
        collect_document_violations(doc, &self.rules)
    }

    /// Bytes to a validated Flight Plan.
    pub fn import_document(&self, bytes: &[u8]) -> Result<FlightPlan, ImportError> {
        let doc = self.parse_document(bytes)?;
        self.validate(&doc)?;
        let plan = canonicalize(&doc);
        validate_flight_plan(&plan, &self.rules.flight_plan)?;
        info!(
            mission = %doc.metadata.name,
            waypoints = plan.waypoints.len(),
            "imported mission document"
        );
        Ok(plan)
    }

    /// Wrap a valid plan in a fresh document.
    ///
    /// Fields the plan does not carry (speeds per waypoint, turn mode,
    /// actions) take template defaults. Safety limits are widened from the
    /// defaults to cover the plan, and the result must pass document
    /// validation so it can be imported again.
    pub fn export_document(
        &self,
        plan: &FlightPlan,
        name: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> Result<MissionDocument, ExportError> {
        validate_flight_plan(plan, &self.rules.flight_plan).map_err(|err| {
            ExportError::InvalidFlightPlan {
                reason: err.to_string(),
            }
        })?;

        let mut metadata = MissionMetadata::new(name, self.default_author.as_str());
        metadata.description = description.map(str::to_string);
        metadata.tags = tags.to_vec();

        let waypoints = plan
            .waypoints
            .iter()
            .map(|wp| MissionWaypoint {
                heading_deg: wp.heading_deg,
                gimbal_pitch_deg: wp.gimbal_pitch_deg,
                ..MissionWaypoint::new(wp.coordinate, wp.altitude_m)
            })
            .collect();

        let doc = MissionDocument {
            metadata,
            settings: MissionSettings {
                max_speed_mps: plan.max_speed_mps,
                auto_speed_mps: plan.auto_speed_mps,
                finished_action: plan.finished_action.into(),
                heading_mode: plan.heading_mode.into(),
                ..MissionSettings::default()
            },
            waypoints,
            safety_limits: self.export_safety_limits(plan)?,
        };
        validate_document(&doc, &self.rules).map_err(|err| ExportError::InvalidFlightPlan {
            reason: err.to_string(),
        })?;
        debug!(name, waypoints = doc.waypoints.len(), "exported flight plan");
        Ok(doc)
    }

    /// Default limits raised to the plan's highest waypoint and longest
    /// segment, kept inside the safety envelope.
    fn export_safety_limits(&self, plan: &FlightPlan) -> Result<SafetyLimits, ExportError> {
        let env = &self.rules.safety;
        let defaults = SafetyLimits::default();

        let highest_m = plan
            .waypoints
            .iter()
            .map(|wp| wp.altitude_m)
            .fold(0.0, f64::max);
        let max_altitude_m = env
            .max_altitude_m
            .clamp(defaults.max_altitude_m.max(highest_m));
        if highest_m > max_altitude_m || !env.max_altitude_m.contains(max_altitude_m) {
            return Err(ExportError::InvalidFlightPlan {
                reason: format!(
                    "altitude {highest_m} m cannot fit maxAltitude {}",
                    env.max_altitude_m
                ),
            });
        }

        let longest_m = plan
            .waypoints
            .windows(2)
            .map(|pair| pair[0].coordinate.distance_to(&pair[1].coordinate))
            .fold(0.0, f64::max);
        let max_distance_from_home_m = env
            .max_distance_from_home_m
            .clamp(defaults.max_distance_from_home_m.max(longest_m));
        if longest_m > max_distance_from_home_m
            || !env.max_distance_from_home_m.contains(max_distance_from_home_m)
        {
            return Err(ExportError::InvalidFlightPlan {
                reason: format!(
                    "segment of {longest_m:.1} m cannot fit maxDistanceFromHome {}",
                    env.max_distance_from_home_m
                ),
            });
        }

        Ok(SafetyLimits {
            max_altitude_m,
            max_distance_from_home_m,
            ..defaults
        })
    }

    /// Basic lowering followed by the vendor gate.
    pub fn translate(&self, plan: &FlightPlan) -> Result<VendorMission, TranslationError> {
        let mission = lower_basic(plan, &self.rules.vendor)?;
        validate_vendor_mission(&mission, &self.rules.vendor)?;
        Ok(mission)
    }

    /// Enhanced lowering followed by the vendor gate.
    pub fn translate_enhanced(
        &self,
        doc: &MissionDocument,
    ) -> Result<VendorMission, TranslationError> {
        let mission = lower_enhanced(doc, &self.rules.vendor)?;
        validate_vendor_mission(&mission, &self.rules.vendor)?;
        Ok(mission)
    }

    /// Build a template document, check it like an import and canonicalize it.
    pub fn build_template(&self, kind: &TemplateKind) -> Result<TemplateMission, TemplateError> {
        let document = templates::build(kind, &self.locations, &self.default_author)?;
        let rejected = |err: ValidationError| TemplateError::InvalidParameters(err.to_string());
        self.validate(&document).map_err(rejected)?;
        let plan = canonicalize(&document);
        validate_flight_plan(&plan, &self.rules.flight_plan).map_err(rejected)?;
        debug!(
            template = kind.name(),
            waypoints = plan.waypoints.len(),
            "built mission template"
        );
        Ok(TemplateMission { document, plan })
    }

    pub fn summarize(&self, plan: &FlightPlan) -> MissionSummary {
        MissionSummary::from(plan)
    }

    /// Pretty JSON for persistence.
    pub fn document_to_json(&self, doc: &MissionDocument) -> Result<Vec<u8>, serde_json::Error> {
        doc.to_json_pretty()
    }
}
