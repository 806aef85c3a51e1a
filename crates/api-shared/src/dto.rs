//! Wire types for the HTTP API.
//!
//! Core types (`OrchestrationResult`, alert and closure records) are embedded as opaque objects
//! in the OpenAPI schema.

use care_core::actions::{AlertRecord, GapClosure};
use care_core::OrchestrationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub status: String,
    pub service: String,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<Utc>,
    pub rabbitmq_connected: bool,
    pub fhir_configured: bool,
}

/// Error body. `success` is omitted on member lookups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
}

impl ErrorRes {
    /// `{success: false, error}`
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: error.into(),
        }
    }

    /// `{error}`
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            success: None,
            error: error.into(),
        }
    }
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ProcessRes {
    pub success: bool,
    #[schema(value_type = Object)]
    pub result: OrchestrationResult,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertReq {
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct AlertRes {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    pub alert: AlertRecord,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CloseGapReq {
    #[serde(default)]
    pub measure_type: Option<String>,
    #[serde(default)]
    pub closure_reason: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub evidence: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CloseGapRes {
    pub success: bool,
    pub message: String,
    #[schema(value_type = Object)]
    pub closure: GapClosure,
}
