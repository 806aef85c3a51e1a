//! FHIR `RiskAssessment` resources carrying one upstream measure prediction.

use crate::datatypes::{Annotation, CodeableConcept, Coding, Reference};
use crate::patient::patient_reference;
use crate::systems;
use care_types::{MeasureType, RiskPrediction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk assessments are only ever emitted as final; there is no draft lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskAssessmentStatus {
    Final,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentResource {
    pub id: String,
    pub status: RiskAssessmentStatus,
    pub subject: Reference,
    pub performed_date_time: DateTime<Utc>,
    pub performer: Reference,
    pub reason_code: Vec<CodeableConcept>,
    pub prediction: Vec<Prediction>,
    pub note: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub outcome: CodeableConcept,
    pub probability_decimal: f64,
    pub qualitative_risk: CodeableConcept,
}

/// Builds the risk assessment for one measure prediction.
///
/// The id is `risk-{member_id}-{measure lower}-{epoch millis of now}`.
pub fn build_risk_assessment(
    member_id: &str,
    prediction: &RiskPrediction,
    measure_type: &MeasureType,
    now: DateTime<Utc>,
) -> RiskAssessmentResource {
    let risk_level = prediction.risk_level;
    let probability = prediction.risk_probability;

    RiskAssessmentResource {
        id: format!(
            "risk-{}-{}-{}",
            member_id,
            measure_type.id_fragment(),
            now.timestamp_millis()
        ),
        status: RiskAssessmentStatus::Final,
        subject: Reference::to(patient_reference(member_id)),
        performed_date_time: now,
        performer: Reference::display(systems::PLATFORM_DISPLAY),
        reason_code: vec![CodeableConcept::coded(Coding::new(
            systems::HEDIS_MEASURES,
            measure_type.as_str(),
            measure_type.display_name(),
        ))],
        prediction: vec![Prediction {
            outcome: CodeableConcept::text(format!("Non-compliance risk for {measure_type}")),
            probability_decimal: probability.value(),
            qualitative_risk: CodeableConcept::coded(Coding::new(
                systems::RISK_PROBABILITY,
                risk_level.code(),
                risk_level.as_str(),
            )),
        }],
        note: vec![Annotation {
            text: format!(
                "Model-generated risk assessment. Risk probability: {}",
                probability.as_percentage()
            ),
        }],
    }
}
