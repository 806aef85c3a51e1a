//! AMQP implementation of [`EventPublisher`].

use async_trait::async_trait;
use care_core::{CareEvent, EventPublisher, PublishError};
use lapin::options::BasicPublishOptions;
use lapin::{BasicProperties, Channel};

pub const JSON_CONTENT_TYPE: &str = "application/json";
/// AMQP delivery mode for messages that survive a broker restart.
pub const PERSISTENT_DELIVERY_MODE: u8 = 2;

/// Publishes care events to the dashboard exchange with publisher confirms.
#[derive(Clone)]
pub struct AmqpPublisher {
    channel: Channel,
    exchange: String,
}

impl AmqpPublisher {
    pub(crate) fn new(channel: Channel, exchange: impl Into<String>) -> Self {
        Self {
            channel,
            exchange: exchange.into(),
        }
    }

    fn properties(event: &CareEvent) -> BasicProperties {
        BasicProperties::default()
            .with_content_type(JSON_CONTENT_TYPE.into())
            .with_delivery_mode(PERSISTENT_DELIVERY_MODE)
            .with_message_id(event.id().into())
    }
}

fn transport(err: lapin::Error) -> PublishError {
    PublishError::Transport(Box::new(err))
}

#[async_trait]
impl EventPublisher for AmqpPublisher {
    async fn publish(&self, event: &CareEvent) -> Result<(), PublishError> {
        if !self.is_connected() {
            return Err(PublishError::NotConnected);
        }

        let payload = event.to_json_bytes()?;
        let routing_key = event.topic().routing_key();

        let confirmation = self
            .channel
            .basic_publish(
                &self.exchange,
                routing_key,
                BasicPublishOptions::default(),
                &payload,
                Self::properties(event),
            )
            .await
            .map_err(transport)?
            .await
            .map_err(transport)?;

        if confirmation.is_nack() {
            return Err(PublishError::Transport(
                format!("broker rejected message on {routing_key}").into(),
            ));
        }

        tracing::debug!(
            exchange = %self.exchange,
            routing_key,
            bytes = payload.len(),
            "Published"
        );
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.channel.status().connected()
    }
}

impl std::fmt::Debug for AmqpPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpPublisher")
            .field("exchange", &self.exchange)
            .field("connected", &self.is_connected())
            .finish()
    }
}
