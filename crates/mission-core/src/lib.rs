//! Survey mission translation and validation.
//!
//! A portable Mission Document is validated, reduced to a canonical Flight
//! Plan, and lowered into a Vendor Mission a flight controller can execute.

pub mod canonical;
pub mod document;
pub mod document_validator;
pub mod error;
pub mod flight_plan;
pub mod geometry;
pub mod locations;
pub mod pipeline;
pub mod plan_validator;
pub mod rules;
pub mod templates;
pub mod translator;
pub mod vendor;
pub mod vendor_validator;

pub use canonical::canonicalize;
pub use document::{
    ActionCommand, ActionKind, DocumentHeadingMode, FinishedAction, GotoFirstWaypointMode,
    MissionAction, MissionDocument, MissionMetadata, MissionSettings, MissionWaypoint,
    SafetyLimits, TurnMode, SCHEMA_VERSION,
};
pub use document_validator::{collect_document_violations, validate_document};
pub use error::{
    ExportError, ImportError, Stage, TemplateError, TranslationError, ValidationError,
};
pub use flight_plan::{FinishAction, FlightPlan, FlightPlanWaypoint, HeadingMode, MissionSummary};
pub use geometry::{haversine_distance, Coordinate};
pub use locations::{TestLocation, TestLocations};
pub use pipeline::{MissionPipeline, TemplateMission};
pub use plan_validator::validate_flight_plan;
pub use rules::{
    CountRange, DocumentEnvelope, FlightPlanEnvelope, PipelineRules, SafetyEnvelope,
    ValueRange, VendorEnvelope,
};
pub use templates::{TemplateBase, TemplateKind};
pub use translator::{lower_basic, lower_enhanced};
pub use vendor::{VendorAction, VendorMission, VendorWaypoint};
pub use vendor_validator::validate_vendor_mission;
