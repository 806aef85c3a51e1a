//! Risk-score consumer.
//!
//! Each delivery on `risk.scores` is an envelope `{id, timestamp, data}` whose `data` is an
//! orchestration request. Successfully orchestrated deliveries are acked; anything that cannot be
//! decoded is logged and nacked without requeue.

use crate::{BrokerError, BrokerResult};
use care_core::{CareOrchestrator, OrchestrationRequest};
use futures::StreamExt;
use lapin::options::{BasicAckOptions, BasicNackOptions};
use lapin::Consumer;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct InboundEnvelope {
    #[serde(default)]
    id: Option<String>,
    data: serde_json::Value,
}

/// Decode one delivery body into an orchestration request.
pub fn decode_risk_score(body: &[u8]) -> BrokerResult<OrchestrationRequest> {
    let envelope: InboundEnvelope = serde_json::from_slice(body).map_err(BrokerError::Envelope)?;
    if let Some(id) = &envelope.id {
        tracing::debug!(envelope_id = %id, "Decoding risk score");
    }
    Ok(OrchestrationRequest::from_json_value(envelope.data)?)
}

pub struct RiskScoreConsumer {
    consumer: Consumer,
    orchestrator: CareOrchestrator,
}

impl RiskScoreConsumer {
    pub(crate) fn new(consumer: Consumer, orchestrator: CareOrchestrator) -> Self {
        Self {
            consumer,
            orchestrator,
        }
    }

    /// Process deliveries until the consumer is cancelled or the connection drops.
    pub async fn run(mut self) -> BrokerResult<()> {
        while let Some(delivery) = self.consumer.next().await {
            let delivery = delivery?;

            match decode_risk_score(&delivery.data) {
                Ok(request) => {
                    self.orchestrator.process(&request).await;
                    delivery.ack(BasicAckOptions::default()).await?;
                }
                Err(err) => {
                    tracing::error!(error = %err, "Rejecting risk score delivery");
                    delivery
                        .nack(BasicNackOptions {
                            requeue: false,
                            ..BasicNackOptions::default()
                        })
                        .await?;
                }
            }
        }

        tracing::info!("Risk score consumer stopped");
        Ok(())
    }
}
