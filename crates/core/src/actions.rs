//! Care-manager actions on a member: manual alerts and gap closures.
//!
//! Both are acknowledged and logged only. Nothing is stored or forwarded.

use crate::constants::GAP_CLOSED_BY;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    #[default]
    Sent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClosureStatus {
    #[default]
    Closed,
}

/// Acknowledgement of a manual alert.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub member_id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub sent_at: DateTime<Utc>,
    pub status: AlertStatus,
}

/// Acknowledgement of a care-gap closure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapClosure {
    pub member_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Value>,
    pub closed_at: DateTime<Utc>,
    pub closed_by: String,
    pub status: ClosureStatus,
}

pub fn record_alert(
    member_id: &str,
    alert_type: Option<String>,
    message: Option<String>,
    now: DateTime<Utc>,
) -> AlertRecord {
    tracing::info!(
        member_id,
        alert_type = alert_type.as_deref().unwrap_or_default(),
        message = message.as_deref().unwrap_or_default(),
        "Manual alert sent"
    );

    AlertRecord {
        member_id: member_id.to_string(),
        alert_type,
        message,
        sent_at: now,
        status: AlertStatus::Sent,
    }
}

pub fn record_gap_closure(
    member_id: &str,
    measure_type: Option<String>,
    closure_reason: Option<String>,
    evidence: Option<Value>,
    now: DateTime<Utc>,
) -> GapClosure {
    tracing::info!(
        member_id,
        measure_type = measure_type.as_deref().unwrap_or_default(),
        closure_reason = closure_reason.as_deref().unwrap_or_default(),
        "Care gap closed"
    );

    GapClosure {
        member_id: member_id.to_string(),
        measure_type,
        closure_reason,
        evidence,
        closed_at: now,
        closed_by: GAP_CLOSED_BY.to_string(),
        status: ClosureStatus::Closed,
    }
}
