//! Inbound request and outbound result of one orchestration pass.

use crate::care_gap::CareGap;
use crate::{CareError, CareResult};
use care_types::{MeasureType, RiskPrediction};
use chrono::{DateTime, Utc};
use fhir::FhirResource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A risk-prediction message from the upstream predictor.
///
/// All five fields are required. Extra upstream fields (`evidence_found`, `measures_detected`,
/// `processing_timestamp`, ...) are ignored. Predictions keep the order they arrived in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationRequest {
    pub message_id: String,
    pub member_id: String,
    pub member_age: u32,
    pub risk_predictions: IndexMap<MeasureType, RiskPrediction>,
    pub high_risk_measures: Vec<MeasureType>,
}

impl OrchestrationRequest {
    /// Parse a request from an already-decoded JSON value, reporting the failing field path.
    pub fn from_json_value(value: serde_json::Value) -> CareResult<Self> {
        serde_path_to_error::deserialize(value).map_err(|err| CareError::InvalidRequest {
            path: err.path().to_string(),
            source: err.into_inner(),
        })
    }

    /// Parse a request from raw JSON bytes (broker deliveries, CLI input).
    pub fn from_json_slice(bytes: &[u8]) -> CareResult<Self> {
        let deserializer = &mut serde_json::Deserializer::from_slice(bytes);
        serde_path_to_error::deserialize(deserializer).map_err(|err| CareError::InvalidRequest {
            path: err.path().to_string(),
            source: err.into_inner(),
        })
    }

    pub fn has_high_risk(&self) -> bool {
        !self.high_risk_measures.is_empty()
    }
}

/// Everything produced by one orchestration pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub message_id: String,
    pub member_id: String,
    pub processing_timestamp: DateTime<Utc>,
    pub care_gaps: Vec<CareGap>,
    pub fhir_resources: Vec<FhirResource>,
    pub high_risk_measures: Vec<MeasureType>,
    pub total_care_gaps: usize,
}
