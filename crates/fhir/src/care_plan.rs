//! FHIR `CarePlan` resources and their care activities.
//!
//! Activity templates exist for two measures only:
//!
//! | measure | always | additionally when risk is HIGH |
//! |---|---|---|
//! | CCS | schedule cervical screening, 90 days | high-priority outreach, 7 days |
//! | WCV | schedule well-child visit, 60 days | parent engagement outreach, 3 days |
//!
//! Every other measure yields a care plan with no activities.

use crate::datatypes::{Annotation, CodeableConcept, Coding, Period, Reference};
use crate::patient::patient_reference;
use crate::systems;
use care_types::{MeasureType, RiskLevel, RiskPrediction};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Wire types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarePlanStatus {
    Active,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarePlanIntent {
    Plan,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    Task,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityStatus {
    NotStarted,
}

/// Priority label written into the care plan note.
///
/// Not the same scale as the care-gap priority: MEDIUM risk maps to `routine` here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarePlanPriority {
    High,
    Routine,
    Low,
}

impl CarePlanPriority {
    pub fn from_risk(risk_level: RiskLevel) -> Self {
        match risk_level {
            RiskLevel::High => Self::High,
            RiskLevel::Medium => Self::Routine,
            RiskLevel::Low | RiskLevel::Unknown => Self::Low,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Routine => "routine",
            Self::Low => "low",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarePlanResource {
    pub id: String,
    pub status: CarePlanStatus,
    pub intent: CarePlanIntent,
    pub category: Vec<CodeableConcept>,
    pub title: String,
    pub description: String,
    pub subject: Reference,
    pub created: DateTime<Utc>,
    pub author: Reference,
    pub goal: Vec<Reference>,
    pub activity: Vec<CarePlanActivity>,
    pub note: Vec<Annotation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarePlanActivity {
    pub detail: ActivityDetail,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetail {
    pub kind: ActivityKind,
    pub code: CodeableConcept,
    pub status: ActivityStatus,
    pub description: String,
    pub scheduled_timing: Timing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub repeat: TimingRepeat,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingRepeat {
    pub bounds_period: Period,
}

// ============================================================================
// Activity templates
// ============================================================================

enum ActivityCode {
    Snomed(&'static str, &'static str),
    Text(&'static str),
}

struct ActivityTemplate {
    code: ActivityCode,
    description: &'static str,
    window_days: i64,
}

const CCS_SCREENING: ActivityTemplate = ActivityTemplate {
    code: ActivityCode::Snomed("439958008", "Cervical cancer screening"),
    description: "Schedule cervical cancer screening (Pap smear)",
    window_days: 90,
};

const CCS_OUTREACH: ActivityTemplate = ActivityTemplate {
    code: ActivityCode::Text("High-priority outreach"),
    description: "Immediate care manager outreach for high-risk member",
    window_days: 7,
};

const WCV_VISIT: ActivityTemplate = ActivityTemplate {
    code: ActivityCode::Snomed("410620009", "Well child visit"),
    description: "Schedule well-child visit",
    window_days: 60,
};

const WCV_OUTREACH: ActivityTemplate = ActivityTemplate {
    code: ActivityCode::Text("Parent engagement outreach"),
    description: "Contact parent/guardian for high-risk pediatric member",
    window_days: 3,
};

fn templates_for(
    measure_type: &MeasureType,
    risk_level: RiskLevel,
) -> Vec<&'static ActivityTemplate> {
    let (routine, urgent) = match measure_type {
        MeasureType::Ccs => (&CCS_SCREENING, &CCS_OUTREACH),
        MeasureType::Wcv => (&WCV_VISIT, &WCV_OUTREACH),
        // No templates for other measures yet.
        MeasureType::Col | MeasureType::Other(_) => return Vec::new(),
    };

    if risk_level.is_high() {
        vec![routine, urgent]
    } else {
        vec![routine]
    }
}

impl ActivityTemplate {
    fn instantiate(&self, now: DateTime<Utc>) -> CarePlanActivity {
        let code = match self.code {
            ActivityCode::Snomed(code, display) => {
                CodeableConcept::coded(Coding::new(systems::SNOMED, code, display))
            }
            ActivityCode::Text(text) => CodeableConcept::text(text),
        };

        CarePlanActivity {
            detail: ActivityDetail {
                kind: ActivityKind::Task,
                code,
                status: ActivityStatus::NotStarted,
                description: self.description.to_string(),
                scheduled_timing: Timing {
                    repeat: TimingRepeat {
                        bounds_period: Period {
                            start: now,
                            end: now + Duration::days(self.window_days),
                        },
                    },
                },
            },
        }
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Builds the care activities for a measure at a given risk level.
pub fn build_care_activities(
    measure_type: &MeasureType,
    risk_level: RiskLevel,
    now: DateTime<Utc>,
) -> Vec<CarePlanActivity> {
    templates_for(measure_type, risk_level)
        .into_iter()
        .map(|template| template.instantiate(now))
        .collect()
}

/// Builds the care-gap closure plan for one measure prediction.
///
/// The id is `careplan-{member_id}-{measure lower}-{epoch millis of now}`.
pub fn build_care_plan(
    member_id: &str,
    prediction: &RiskPrediction,
    measure_type: &MeasureType,
    now: DateTime<Utc>,
) -> CarePlanResource {
    let risk_level = prediction.risk_level;
    let priority = CarePlanPriority::from_risk(risk_level);
    let fragment = measure_type.id_fragment();

    CarePlanResource {
        id: format!(
            "careplan-{}-{}-{}",
            member_id,
            fragment,
            now.timestamp_millis()
        ),
        status: CarePlanStatus::Active,
        intent: CarePlanIntent::Plan,
        category: vec![CodeableConcept::coded(Coding::new(
            systems::CAREPLAN_CATEGORY,
            "assess-plan",
            "Assessment and Plan of Treatment",
        ))],
        title: format!("{measure_type} Care Gap Closure Plan"),
        description: format!(
            "Proactive care plan for {measure_type} compliance based on predicted risk"
        ),
        subject: Reference::to(patient_reference(member_id)),
        created: now,
        author: Reference::display(systems::PLATFORM_DISPLAY),
        goal: vec![Reference::to(format!("Goal/goal-{member_id}-{fragment}"))],
        activity: build_care_activities(measure_type, risk_level, now),
        note: vec![Annotation {
            text: format!(
                "Generated from predicted risk. Risk level: {}, Priority: {}",
                risk_level,
                priority.as_str()
            ),
        }],
    }
}
