//! FHIR-shaped resource synthesis for care orchestration.
//!
//! This crate builds the FHIR R4-shaped resources that accompany every care gap:
//! - `Patient` (one per orchestration pass)
//! - `RiskAssessment` (one per measure prediction)
//! - `CarePlan` with nested care activities (one per measure prediction)
//!
//! This crate focuses on:
//! - typed wire models serialised with FHIR JSON field names (`camelCase`, `resourceType`)
//! - pure builder functions: no I/O, no clock reads, no failure paths
//!
//! Resources are fabricated locally. They are never sent to a FHIR server and never validated
//! against a FHIR profile. Builders take the current instant as an argument so that callers
//! control time.

pub mod care_plan;
pub mod datatypes;
pub mod patient;
pub mod resource;
pub mod risk_assessment;

// Re-export builders
pub use care_plan::{build_care_activities, build_care_plan};
pub use patient::{build_patient, patient_id, patient_reference};
pub use risk_assessment::build_risk_assessment;

// Re-export wire models
pub use care_plan::{CarePlanActivity, CarePlanPriority, CarePlanResource};
pub use patient::{AdministrativeGender, PatientResource};
pub use resource::FhirResource;
pub use risk_assessment::RiskAssessmentResource;

/// Coding systems and fixed identifiers used across resources.
pub mod systems {
    /// HL7 v2 identifier type table.
    pub const IDENTIFIER_TYPE: &str = "http://terminology.hl7.org/CodeSystem/v2-0203";
    /// Member identifiers issued by the health plan.
    pub const MEMBER_ID: &str = "https://hedis.example.org/member-id";
    /// HEDIS quality-measure codes.
    pub const HEDIS_MEASURES: &str = "https://hedis.example.org/hedis-measures";
    pub const RISK_PROBABILITY: &str = "http://terminology.hl7.org/CodeSystem/risk-probability";
    pub const CAREPLAN_CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/careplan-category";
    pub const SNOMED: &str = "http://snomed.info/sct";

    /// Display name used for the performer/author of synthesized resources.
    pub const PLATFORM_DISPLAY: &str = "HEDIS AI Platform";
}
