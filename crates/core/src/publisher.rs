//! Event publication seam.
//!
//! Orchestration results leave the service on two logical channels:
//! - [`Topic::CareGapCreated`]: every pass, carrying the full [`OrchestrationResult`]
//! - [`Topic::CareAlertHigh`]: only when the request named high-risk measures
//!
//! The [`EventPublisher`] trait is the only thing the orchestrator knows about transport. The
//! AMQP implementation lives in `care-broker`; this module provides the in-process ones.

use crate::care_gap::GapPriority;
use crate::constants::HIGH_RISK_ALERT_TYPE;
use crate::model::OrchestrationResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Logical output channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topic {
    CareGapCreated,
    CareAlertHigh,
}

impl Topic {
    pub fn name(self) -> &'static str {
        match self {
            Self::CareGapCreated => "care-gap-created",
            Self::CareAlertHigh => "care-alert-high",
        }
    }

    pub fn routing_key(self) -> &'static str {
        match self {
            Self::CareGapCreated => "care.gap.created",
            Self::CareAlertHigh => "care.alert.high",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Wire envelope shared by every published and consumed message.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub data: T,
}

impl<T> EventEnvelope<T> {
    pub fn new(id: String, timestamp: DateTime<Utc>, data: T) -> Self {
        Self {
            id,
            timestamp,
            data,
        }
    }
}

/// Alert payload: the orchestration result with alert fields alongside.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HighRiskAlert {
    #[serde(flatten)]
    pub result: OrchestrationResult,
    pub alert_type: String,
    pub priority: GapPriority,
    pub requires_immediate_attention: bool,
}

impl HighRiskAlert {
    pub fn new(result: OrchestrationResult) -> Self {
        Self {
            result,
            alert_type: HIGH_RISK_ALERT_TYPE.to_string(),
            priority: GapPriority::High,
            requires_immediate_attention: true,
        }
    }
}

/// A message ready for publication.
#[derive(Clone, Debug, PartialEq)]
pub enum CareEvent {
    GapCreated(EventEnvelope<OrchestrationResult>),
    HighRiskAlert(EventEnvelope<HighRiskAlert>),
}

impl CareEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::GapCreated(_) => Topic::CareGapCreated,
            Self::HighRiskAlert(_) => Topic::CareAlertHigh,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::GapCreated(envelope) => &envelope.id,
            Self::HighRiskAlert(envelope) => &envelope.id,
        }
    }

    /// JSON body of the envelope.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, PublishError> {
        let bytes = match self {
            Self::GapCreated(envelope) => serde_json::to_vec(envelope)?,
            Self::HighRiskAlert(envelope) => serde_json::to_vec(envelope)?,
        };
        Ok(bytes)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("no broker channel")]
    NotConnected,
    #[error("failed to serialise event: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("broker transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Capability to hand one event to the message transport.
///
/// Implementations never retry and never queue locally; the caller decides what a failure means.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: &CareEvent) -> Result<(), PublishError>;

    fn is_connected(&self) -> bool;
}

/// Publisher used when no broker is available.
///
/// Every publish reports [`PublishError::NotConnected`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DisconnectedPublisher;

#[async_trait]
impl EventPublisher for DisconnectedPublisher {
    async fn publish(&self, _event: &CareEvent) -> Result<(), PublishError> {
        Err(PublishError::NotConnected)
    }

    fn is_connected(&self) -> bool {
        false
    }
}

/// Records published events in memory. Used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    events: Mutex<Vec<CareEvent>>,
    fail_with_transport_error: bool,
}

impl InMemoryPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A connected publisher whose every publish fails with a transport error.
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail_with_transport_error: true,
        }
    }

    pub fn events(&self) -> Vec<CareEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(CareEvent::topic)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for InMemoryPublisher {
    async fn publish(&self, event: &CareEvent) -> Result<(), PublishError> {
        if self.fail_with_transport_error {
            return Err(PublishError::Transport("simulated broker failure".into()));
        }
        // Serialise as the real transport would, so unserialisable events fail here too.
        event.to_json_bytes()?;
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result() -> OrchestrationResult {
        OrchestrationResult {
            message_id: "msg-1".into(),
            member_id: "M1".into(),
            processing_timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            care_gaps: Vec::new(),
            fhir_resources: Vec::new(),
            high_risk_measures: vec![care_types::MeasureType::Ccs],
            total_care_gaps: 0,
        }
    }

    #[test]
    fn topics_have_routing_keys() {
        assert_eq!(Topic::CareGapCreated.routing_key(), "care.gap.created");
        assert_eq!(Topic::CareAlertHigh.routing_key(), "care.alert.high");
        assert_eq!(Topic::CareAlertHigh.to_string(), "care-alert-high");
    }

    #[test]
    fn alert_payload_flattens_result() {
        let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap();
        let event = CareEvent::HighRiskAlert(EventEnvelope::new(
            "evt-1".into(),
            ts,
            HighRiskAlert::new(result()),
        ));

        let json: serde_json::Value =
            serde_json::from_slice(&event.to_json_bytes().expect("serialise")).expect("json");
        assert_eq!(json["id"], "evt-1");
        assert_eq!(json["data"]["member_id"], "M1");
        assert_eq!(json["data"]["alert_type"], "HIGH_RISK_CARE_GAP");
        assert_eq!(json["data"]["priority"], "high");
        assert_eq!(json["data"]["requires_immediate_attention"], true);
        assert_eq!(json["data"]["high_risk_measures"][0], "CCS");
    }

    #[tokio::test]
    async fn disconnected_publisher_reports_not_connected() {
        let publisher = DisconnectedPublisher;
        let event = CareEvent::GapCreated(EventEnvelope::new(
            "evt".into(),
            Utc::now(),
            result(),
        ));
        assert!(!publisher.is_connected());
        assert!(matches!(
            publisher.publish(&event).await,
            Err(PublishError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn in_memory_publisher_records_topics() {
        let publisher = InMemoryPublisher::new();
        let event = CareEvent::GapCreated(EventEnvelope::new(
            "evt".into(),
            Utc::now(),
            result(),
        ));
        publisher.publish(&event).await.expect("publish");
        assert_eq!(publisher.topics(), vec![Topic::CareGapCreated]);
        assert_eq!(publisher.events()[0].id(), "evt");
    }
}
