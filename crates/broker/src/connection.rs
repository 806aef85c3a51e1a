//! Broker connection lifecycle.

use crate::config::BrokerConfig;
use crate::consumer::RiskScoreConsumer;
use crate::publisher::AmqpPublisher;
use crate::{BrokerError, BrokerResult};
use care_core::constants::SERVICE_NAME;
use care_core::{CareOrchestrator, DisconnectedPublisher, EventPublisher};
use lapin::options::{
    BasicConsumeOptions, BasicQosOptions, ConfirmSelectOptions, ExchangeDeclareOptions,
    QueueBindOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, ExchangeKind};
use std::sync::Arc;

/// An open broker connection with the care topology declared.
pub struct AmqpBroker {
    config: BrokerConfig,
    connection: Connection,
    channel: Channel,
}

impl AmqpBroker {
    /// Connect within the configured timeout, declare the topology and enable publisher confirms.
    pub async fn connect(config: BrokerConfig) -> BrokerResult<Self> {
        tracing::info!(url = %config.redacted_url(), "Connecting to broker");

        let connection = tokio::time::timeout(
            config.connect_timeout(),
            Connection::connect(config.url(), ConnectionProperties::default()),
        )
        .await
        .map_err(|_| BrokerError::ConnectTimeout(config.connect_timeout()))??;

        let channel = connection.create_channel().await?;
        declare_topology(&channel, &config).await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;

        tracing::info!("Connected to broker");
        Ok(Self {
            config,
            connection,
            channel,
        })
    }

    pub fn is_connected(&self) -> bool {
        self.connection.status().connected()
    }

    pub fn publisher(&self) -> AmqpPublisher {
        AmqpPublisher::new(self.channel.clone(), self.config.publish_exchange())
    }

    /// Start consuming risk scores on a dedicated channel, one delivery at a time.
    pub async fn consumer(
        &self,
        orchestrator: CareOrchestrator,
    ) -> BrokerResult<RiskScoreConsumer> {
        let channel = self.connection.create_channel().await?;
        channel.basic_qos(1, BasicQosOptions::default()).await?;

        let consumer = channel
            .basic_consume(
                self.config.consume_queue(),
                SERVICE_NAME,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        tracing::info!(queue = self.config.consume_queue(), "Consuming risk scores");
        Ok(RiskScoreConsumer::new(consumer, orchestrator))
    }

    /// Close the channel and then the connection. Both are always attempted; the first failure
    /// is returned.
    pub async fn close(self) -> BrokerResult<()> {
        let channel = self.channel.close(200, "shutdown").await;
        let connection = self.connection.close(200, "shutdown").await;
        settle_close(channel, connection)
    }
}

fn settle_close(
    channel: Result<(), lapin::Error>,
    connection: Result<(), lapin::Error>,
) -> BrokerResult<()> {
    if let Err(err) = &channel {
        tracing::warn!(error = %err, "Failed to close broker channel");
    }
    if let Err(err) = &connection {
        tracing::warn!(error = %err, "Failed to close broker connection");
    }
    channel.and(connection)?;
    tracing::info!("Broker connection closed");
    Ok(())
}

async fn declare_topology(channel: &Channel, config: &BrokerConfig) -> BrokerResult<()> {
    for exchange in config.exchanges() {
        channel
            .exchange_declare(
                exchange,
                ExchangeKind::Topic,
                ExchangeDeclareOptions {
                    durable: true,
                    ..ExchangeDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
    }

    for binding in config.bindings() {
        channel
            .queue_declare(
                &binding.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;
        channel
            .queue_bind(
                &binding.queue,
                &binding.exchange,
                &binding.routing_key,
                QueueBindOptions::default(),
                FieldTable::default(),
            )
            .await?;
    }

    Ok(())
}

/// Connect when a broker is configured, otherwise (or on failure) degrade to a publisher that
/// never reaches a broker.
pub async fn connect_or_disconnected(
    config: Option<BrokerConfig>,
) -> (Arc<dyn EventPublisher>, Option<AmqpBroker>) {
    let Some(config) = config else {
        tracing::info!("AMQP_URL not set, running without broker");
        return (Arc::new(DisconnectedPublisher), None);
    };

    match AmqpBroker::connect(config).await {
        Ok(broker) => (Arc::new(broker.publisher()), Some(broker)),
        Err(err) => {
            tracing::warn!(error = %err, "Broker unavailable, continuing without publishing");
            (Arc::new(DisconnectedPublisher), None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lapin::{ChannelState, ConnectionState};
    use std::time::Duration;

    fn channel_closed() -> lapin::Error {
        lapin::Error::InvalidChannelState(ChannelState::Closed)
    }

    fn connection_closed() -> lapin::Error {
        lapin::Error::InvalidConnectionState(ConnectionState::Closed)
    }

    #[test]
    fn close_reports_first_failure() {
        assert!(settle_close(Ok(()), Ok(())).is_ok());

        let err = settle_close(Err(channel_closed()), Ok(())).expect_err("channel failed");
        assert!(matches!(
            err,
            BrokerError::Amqp(lapin::Error::InvalidChannelState(_))
        ));

        let err = settle_close(Ok(()), Err(connection_closed())).expect_err("connection failed");
        assert!(matches!(
            err,
            BrokerError::Amqp(lapin::Error::InvalidConnectionState(_))
        ));

        let err = settle_close(Err(channel_closed()), Err(connection_closed()))
            .expect_err("both failed");
        assert!(matches!(
            err,
            BrokerError::Amqp(lapin::Error::InvalidChannelState(_))
        ));
    }

    #[tokio::test]
    async fn no_config_degrades_to_disconnected() {
        let (publisher, broker) = connect_or_disconnected(None).await;
        assert!(!publisher.is_connected());
        assert!(broker.is_none());
    }

    #[tokio::test]
    async fn unreachable_broker_degrades_to_disconnected() {
        // Port 1 on loopback refuses connections.
        let config = BrokerConfig::new("amqp://127.0.0.1:1/%2f".into(), Duration::from_secs(2))
            .expect("valid");
        let (publisher, broker) = connect_or_disconnected(Some(config)).await;
        assert!(!publisher.is_connected());
        assert!(broker.is_none());
    }
}
