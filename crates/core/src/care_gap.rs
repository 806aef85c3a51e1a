//! Care-gap derivation.
//!
//! One [`CareGap`] is derived per measure prediction. Its priority mapping differs from the
//! care-plan priority (`MEDIUM` is `medium` here, `routine` on the plan), and its intervention
//! due date comes from a fixed table keyed by risk level and measure.

use care_types::{MeasureType, RiskLevel, RiskPrediction};
use chrono::{DateTime, Duration, Utc};
use fhir::{CarePlanResource, RiskAssessmentResource};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapPriority {
    High,
    Medium,
    Low,
}

impl GapPriority {
    pub fn from_risk(risk_level: RiskLevel) -> Self {
        match risk_level {
            RiskLevel::High => Self::High,
            RiskLevel::Medium => Self::Medium,
            RiskLevel::Low | RiskLevel::Unknown => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Care gaps are always created open; closure is only acknowledged, never stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStatus {
    #[default]
    Open,
}

/// Summary record of one open care gap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareGap {
    pub id: String,
    pub member_id: String,
    pub member_age: u32,
    pub measure_type: MeasureType,
    pub risk_level: RiskLevel,
    pub risk_probability: f64,
    pub priority: GapPriority,
    pub created_timestamp: DateTime<Utc>,
    pub care_plan_id: String,
    pub risk_assessment_id: String,
    pub status: GapStatus,
    pub intervention_due_date: DateTime<Utc>,
}

/// Days until intervention is due.
///
/// | risk      | WCV | other |
/// |-----------|-----|-------|
/// | HIGH      | 3   | 7     |
/// | MEDIUM    | 30  | 45    |
/// | LOW/other | 60  | 90    |
pub fn intervention_offset_days(measure_type: &MeasureType, risk_level: RiskLevel) -> i64 {
    let wcv = *measure_type == MeasureType::Wcv;
    match (risk_level, wcv) {
        (RiskLevel::High, true) => 3,
        (RiskLevel::High, false) => 7,
        (RiskLevel::Medium, true) => 30,
        (RiskLevel::Medium, false) => 45,
        (_, true) => 60,
        (_, false) => 90,
    }
}

pub fn intervention_due_date(
    measure_type: &MeasureType,
    risk_level: RiskLevel,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    now + Duration::days(intervention_offset_days(measure_type, risk_level))
}

/// Derive the care gap for one measure prediction.
///
/// `resources` are the risk assessment and care plan built for the same prediction in the same
/// pass; their ids are recorded on the gap.
pub fn derive_care_gap(
    id: String,
    member_id: &str,
    member_age: u32,
    measure_type: &MeasureType,
    prediction: &RiskPrediction,
    resources: (&RiskAssessmentResource, &CarePlanResource),
    now: DateTime<Utc>,
) -> CareGap {
    let (risk_assessment, care_plan) = resources;
    let risk_level = prediction.risk_level;

    CareGap {
        id,
        member_id: member_id.to_string(),
        member_age,
        measure_type: measure_type.clone(),
        risk_level,
        risk_probability: prediction.risk_probability.value(),
        priority: GapPriority::from_risk(risk_level),
        created_timestamp: now,
        care_plan_id: care_plan.id.clone(),
        risk_assessment_id: risk_assessment.id.clone(),
        status: GapStatus::Open,
        intervention_due_date: intervention_due_date(measure_type, risk_level, now),
    }
}
