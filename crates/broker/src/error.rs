use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("invalid broker configuration: {0}")]
    InvalidConfig(String),
    #[error("timed out connecting to broker after {0:?}")]
    ConnectTimeout(Duration),
    #[error("AMQP error: {0}")]
    Amqp(#[from] lapin::Error),
    #[error("malformed risk-score envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error(transparent)]
    Care(#[from] care_core::CareError),
}

pub type BrokerResult<T> = std::result::Result<T, BrokerError>;
