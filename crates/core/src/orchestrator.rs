//! The care-gap orchestration pipeline.
//!
//! Per inbound request: one Patient, then per measure prediction a RiskAssessment, a CarePlan and
//! a derived CareGap. The aggregate result is published on the gap-created channel, and on the
//! high-risk alert channel when the request named any high-risk measures.

use crate::care_gap::derive_care_gap;
use crate::model::{OrchestrationRequest, OrchestrationResult};
use crate::publisher::{CareEvent, EventEnvelope, EventPublisher, HighRiskAlert, PublishError};
use crate::CareResult;
use care_uuid::{Clock, IdGenerator, SystemClock, UuidGenerator};
use fhir::{build_care_plan, build_patient, build_risk_assessment, FhirResource};
use std::sync::Arc;

/// Orchestrates FHIR synthesis, care-gap derivation and publication.
#[derive(Clone)]
pub struct CareOrchestrator {
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl CareOrchestrator {
    /// Orchestrator with the system clock and random UUIDs.
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self::with_capabilities(publisher, Arc::new(SystemClock), Arc::new(UuidGenerator))
    }

    pub fn with_capabilities(
        publisher: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            publisher,
            clock,
            ids,
        }
    }

    pub fn publisher_connected(&self) -> bool {
        self.publisher.is_connected()
    }

    /// Build the resources and care gaps for a request without publishing anything.
    ///
    /// The clock is read once, so every resource in the pass shares the same instant.
    pub fn synthesize(&self, request: &OrchestrationRequest) -> OrchestrationResult {
        let now = self.clock.now();
        let member_id = request.member_id.as_str();

        let mut fhir_resources = Vec::with_capacity(1 + 2 * request.risk_predictions.len());
        let mut care_gaps = Vec::with_capacity(request.risk_predictions.len());

        fhir_resources.push(FhirResource::from(build_patient(
            member_id,
            request.member_age,
            now,
        )));

        for (measure_type, prediction) in &request.risk_predictions {
            let risk_assessment = build_risk_assessment(member_id, prediction, measure_type, now);
            let care_plan = build_care_plan(member_id, prediction, measure_type, now);

            care_gaps.push(derive_care_gap(
                self.ids.new_id(),
                member_id,
                request.member_age,
                measure_type,
                prediction,
                (&risk_assessment, &care_plan),
                now,
            ));

            fhir_resources.push(risk_assessment.into());
            fhir_resources.push(care_plan.into());
        }

        let total_care_gaps = care_gaps.len();
        OrchestrationResult {
            message_id: request.message_id.clone(),
            member_id: request.member_id.clone(),
            processing_timestamp: now,
            care_gaps,
            fhir_resources,
            high_risk_measures: request.high_risk_measures.clone(),
            total_care_gaps,
        }
    }

    /// Run one full orchestration pass.
    ///
    /// Publication failures are logged and never fail the pass.
    pub async fn process(&self, request: &OrchestrationRequest) -> OrchestrationResult {
        tracing::info!(
            message_id = %request.message_id,
            member_id = %request.member_id,
            "Processing risk prediction"
        );

        let result = self.synthesize(request);

        let gap_event = CareEvent::GapCreated(self.envelope(result.clone()));
        self.publish_logged(&gap_event, &result).await;

        if request.has_high_risk() {
            let alert_event =
                CareEvent::HighRiskAlert(self.envelope(HighRiskAlert::new(result.clone())));
            self.publish_logged(&alert_event, &result).await;
        }

        tracing::info!(
            message_id = %result.message_id,
            care_gaps = result.total_care_gaps,
            "Care orchestration completed"
        );
        result
    }

    /// Parse a raw JSON request and run it.
    pub async fn process_json(&self, body: serde_json::Value) -> CareResult<OrchestrationResult> {
        let request = OrchestrationRequest::from_json_value(body)?;
        Ok(self.process(&request).await)
    }

    fn envelope<T>(&self, data: T) -> EventEnvelope<T> {
        EventEnvelope::new(self.ids.new_id(), self.clock.now(), data)
    }

    async fn publish_logged(&self, event: &CareEvent, result: &OrchestrationResult) {
        match self.publisher.publish(event).await {
            Ok(()) => tracing::info!(
                topic = %event.topic(),
                member_id = %result.member_id,
                care_gaps = result.total_care_gaps,
                "Published care event"
            ),
            Err(PublishError::NotConnected) => tracing::info!(
                topic = %event.topic(),
                member_id = %result.member_id,
                "Care event not published (no broker channel)"
            ),
            Err(err) => tracing::error!(
                topic = %event.topic(),
                member_id = %result.member_id,
                error = %err,
                "Failed to publish care event"
            ),
        }
    }
}

impl std::fmt::Debug for CareOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CareOrchestrator")
            .field("publisher_connected", &self.publisher.is_connected())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::care_gap::GapPriority;
    use crate::publisher::{DisconnectedPublisher, InMemoryPublisher, Topic};
    use crate::CareError;
    use care_types::{MeasureType, RiskLevel, RiskPrediction};
    use care_uuid::{FixedClock, SequentialIdGenerator};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;
    use indexmap::IndexMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 9, 30, 0).unwrap()
    }

    fn orchestrator(publisher: Arc<dyn EventPublisher>) -> CareOrchestrator {
        CareOrchestrator::with_capabilities(
            publisher,
            Arc::new(FixedClock::new(now())),
            Arc::new(SequentialIdGenerator::new("id")),
        )
    }

    fn request(
        predictions: &[(MeasureType, RiskLevel, f64)],
        high_risk: &[MeasureType],
    ) -> OrchestrationRequest {
        OrchestrationRequest {
            message_id: "msg-1".into(),
            member_id: "12345678".into(),
            member_age: 45,
            risk_predictions: predictions
                .iter()
                .map(|(m, level, p)| (m.clone(), RiskPrediction::new(*level, *p)))
                .collect::<IndexMap<_, _>>(),
            high_risk_measures: high_risk.to_vec(),
        }
    }

    #[tokio::test]
    async fn ccs_high_creates_one_gap_and_publishes_both_channels() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let orch = orchestrator(publisher.clone());

        let result = orch
            .process(&request(
                &[(MeasureType::Ccs, RiskLevel::High, 0.85)],
                &[MeasureType::Ccs],
            ))
            .await;

        assert_eq!(result.total_care_gaps, 1);
        assert_eq!(result.fhir_resources.len(), 3);
        let gap = &result.care_gaps[0];
        assert_eq!(gap.priority, GapPriority::High);
        assert_eq!(gap.intervention_due_date, now() + Duration::days(7));
        assert_eq!(
            publisher.topics(),
            vec![Topic::CareGapCreated, Topic::CareAlertHigh]
        );
    }

    #[tokio::test]
    async fn empty_predictions_produce_patient_only_and_no_alert() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let orch = orchestrator(publisher.clone());

        let result = orch.process(&request(&[], &[])).await;

        assert_eq!(result.total_care_gaps, 0);
        assert_eq!(result.fhir_resources.len(), 1);
        assert_eq!(result.fhir_resources[0].resource_type(), "Patient");
        assert_eq!(publisher.topics(), vec![Topic::CareGapCreated]);
    }

    #[tokio::test]
    async fn resources_reference_the_patient_and_gaps_reference_resources() {
        let orch = orchestrator(Arc::new(InMemoryPublisher::new()));
        let result = orch
            .process(&request(
                &[
                    (MeasureType::Ccs, RiskLevel::Medium, 0.6),
                    (MeasureType::Wcv, RiskLevel::Low, 0.1),
                    (MeasureType::Col, RiskLevel::Unknown, 0.5),
                ],
                &[],
            ))
            .await;

        assert_eq!(result.total_care_gaps, 3);
        assert_eq!(result.care_gaps.len(), result.total_care_gaps);
        assert_eq!(result.fhir_resources.len(), 1 + 2 * 3);

        for resource in result.fhir_resources.iter().skip(1) {
            assert_eq!(resource.subject_reference(), Some("Patient/patient-12345678"));
        }

        let ids: Vec<&str> = result.fhir_resources.iter().map(FhirResource::id).collect();
        for gap in &result.care_gaps {
            assert!(ids.contains(&gap.care_plan_id.as_str()));
            assert!(ids.contains(&gap.risk_assessment_id.as_str()));
        }
    }

    #[tokio::test]
    async fn measures_are_processed_in_arrival_order() {
        let orch = orchestrator(Arc::new(InMemoryPublisher::new()));
        let result = orch
            .process(&request(
                &[
                    (MeasureType::Wcv, RiskLevel::Low, 0.1),
                    (MeasureType::Ccs, RiskLevel::Low, 0.1),
                ],
                &[],
            ))
            .await;

        let order: Vec<&MeasureType> = result.care_gaps.iter().map(|g| &g.measure_type).collect();
        assert_eq!(order, vec![&MeasureType::Wcv, &MeasureType::Ccs]);

        let kinds: Vec<&str> = result
            .fhir_resources
            .iter()
            .map(FhirResource::resource_type)
            .collect();
        assert_eq!(
            kinds,
            vec!["Patient", "RiskAssessment", "CarePlan", "RiskAssessment", "CarePlan"]
        );
        assert_eq!(result.care_gaps[0].measure_type, MeasureType::Wcv);
        assert_eq!(result.care_gaps[0].id, "id-1");
        assert_eq!(result.care_gaps[1].id, "id-2");
    }

    #[tokio::test]
    async fn alert_follows_high_risk_list_not_levels() {
        let publisher = Arc::new(InMemoryPublisher::new());
        let orch = orchestrator(publisher.clone());

        orch.process(&request(&[(MeasureType::Ccs, RiskLevel::High, 0.9)], &[]))
            .await;
        assert_eq!(publisher.topics(), vec![Topic::CareGapCreated]);

        let publisher = Arc::new(InMemoryPublisher::new());
        let orch = orchestrator(publisher.clone());
        orch.process(&request(
            &[(MeasureType::Ccs, RiskLevel::Low, 0.1)],
            &[MeasureType::Col],
        ))
        .await;
        assert_eq!(
            publisher.topics(),
            vec![Topic::CareGapCreated, Topic::CareAlertHigh]
        );
    }

    #[tokio::test]
    async fn publish_failures_do_not_fail_the_pass() {
        let publishers: [Arc<dyn EventPublisher>; 2] = [
            Arc::new(DisconnectedPublisher),
            Arc::new(InMemoryPublisher::failing()),
        ];
        for publisher in publishers {
            let orch = orchestrator(publisher);
            let result = orch
                .process(&request(
                    &[(MeasureType::Wcv, RiskLevel::High, 0.9)],
                    &[MeasureType::Wcv],
                ))
                .await;
            assert_eq!(result.total_care_gaps, 1);
        }
    }

    #[tokio::test]
    async fn process_json_rejects_missing_fields() {
        let orch = orchestrator(Arc::new(DisconnectedPublisher));
        let err = orch
            .process_json(json!({"message_id": "m", "member_id": "1"}))
            .await
            .expect_err("missing fields");
        assert!(matches!(err, CareError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn process_json_applies_defaults() {
        let orch = orchestrator(Arc::new(DisconnectedPublisher));
        let result = orch
            .process_json(json!({
                "message_id": "m",
                "member_id": "12345678",
                "member_age": 30,
                "risk_predictions": {"CCS": {"risk_level": null}},
                "high_risk_measures": []
            }))
            .await
            .expect("valid request");

        let gap = &result.care_gaps[0];
        assert_eq!(gap.risk_level, RiskLevel::Unknown);
        assert_eq!(gap.risk_probability, 0.5);
        assert_eq!(gap.priority, GapPriority::Low);
        assert_eq!(gap.intervention_due_date, now() + Duration::days(90));
    }
}
