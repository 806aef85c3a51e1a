//! The closed set of resources produced by an orchestration pass.

use crate::care_plan::CarePlanResource;
use crate::patient::PatientResource;
use crate::risk_assessment::RiskAssessmentResource;
use serde::{Deserialize, Serialize};

/// Any synthesized resource, tagged on the wire by `resourceType`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType")]
pub enum FhirResource {
    Patient(PatientResource),
    RiskAssessment(RiskAssessmentResource),
    CarePlan(CarePlanResource),
}

impl FhirResource {
    pub fn id(&self) -> &str {
        match self {
            Self::Patient(r) => &r.id,
            Self::RiskAssessment(r) => &r.id,
            Self::CarePlan(r) => &r.id,
        }
    }

    pub fn resource_type(&self) -> &'static str {
        match self {
            Self::Patient(_) => "Patient",
            Self::RiskAssessment(_) => "RiskAssessment",
            Self::CarePlan(_) => "CarePlan",
        }
    }

    /// The `subject.reference` of non-Patient resources; `None` for a Patient.
    pub fn subject_reference(&self) -> Option<&str> {
        match self {
            Self::Patient(_) => None,
            Self::RiskAssessment(r) => r.subject.reference.as_deref(),
            Self::CarePlan(r) => r.subject.reference.as_deref(),
        }
    }
}

impl From<PatientResource> for FhirResource {
    fn from(resource: PatientResource) -> Self {
        Self::Patient(resource)
    }
}

impl From<RiskAssessmentResource> for FhirResource {
    fn from(resource: RiskAssessmentResource) -> Self {
        Self::RiskAssessment(resource)
    }
}

impl From<CarePlanResource> for FhirResource {
    fn from(resource: CarePlanResource) -> Self {
        Self::CarePlan(resource)
    }
}
