//! Broker configuration, resolved once at startup.

use crate::{BrokerError, BrokerResult};
use std::time::Duration;

pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Exchange the upstream predictor publishes risk scores to.
pub const CARE_EXCHANGE: &str = "care.exchange";
/// Exchange care-gap and alert events are published to.
pub const DASHBOARD_EXCHANGE: &str = "dashboard.exchange";

pub const RISK_SCORES_QUEUE: &str = "risk.scores";
pub const RISK_CALCULATED_ROUTING_KEY: &str = "risk.calculated";
pub const CARE_GAPS_QUEUE: &str = "care.gaps";
pub const CARE_ALERTS_QUEUE: &str = "care.alerts";

/// A durable queue and the exchange/routing key it is bound with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueBinding {
    pub queue: String,
    pub exchange: String,
    pub routing_key: String,
}

impl QueueBinding {
    fn new(queue: &str, exchange: &str, routing_key: &str) -> Self {
        Self {
            queue: queue.into(),
            exchange: exchange.into(),
            routing_key: routing_key.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BrokerConfig {
    url: String,
    connect_timeout: Duration,
}

impl BrokerConfig {
    pub fn new(url: String, connect_timeout: Duration) -> BrokerResult<Self> {
        if !(url.starts_with("amqp://") || url.starts_with("amqps://")) {
            return Err(BrokerError::InvalidConfig(
                "AMQP_URL must start with amqp:// or amqps://".into(),
            ));
        }
        if connect_timeout.is_zero() {
            return Err(BrokerError::InvalidConfig(
                "connect timeout must be positive".into(),
            ));
        }
        Ok(Self {
            url,
            connect_timeout,
        })
    }

    /// Resolve from the raw `AMQP_URL` and `AMQP_CONNECT_TIMEOUT_SECS` values.
    ///
    /// An unset or blank URL disables the broker (`Ok(None)`).
    pub fn from_env_values(
        url: Option<String>,
        connect_timeout_secs: Option<String>,
    ) -> BrokerResult<Option<Self>> {
        let Some(url) = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()) else {
            return Ok(None);
        };

        let secs = match connect_timeout_secs {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                BrokerError::InvalidConfig(format!(
                    "AMQP_CONNECT_TIMEOUT_SECS is not a number: {raw}"
                ))
            })?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        Self::new(url, Duration::from_secs(secs)).map(Some)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL with any password replaced, for logging.
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                let credentials = &self.url[scheme_end + 3..at];
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{}{}:***{}", &self.url[..scheme_end + 3], user, &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn exchanges(&self) -> [&'static str; 2] {
        [CARE_EXCHANGE, DASHBOARD_EXCHANGE]
    }

    pub fn publish_exchange(&self) -> &'static str {
        DASHBOARD_EXCHANGE
    }

    pub fn bindings(&self) -> Vec<QueueBinding> {
        use care_core::Topic;

        vec![
            QueueBinding::new(RISK_SCORES_QUEUE, CARE_EXCHANGE, RISK_CALCULATED_ROUTING_KEY),
            QueueBinding::new(
                CARE_GAPS_QUEUE,
                DASHBOARD_EXCHANGE,
                Topic::CareGapCreated.routing_key(),
            ),
            QueueBinding::new(
                CARE_ALERTS_QUEUE,
                DASHBOARD_EXCHANGE,
                Topic::CareAlertHigh.routing_key(),
            ),
        ]
    }

    pub fn consume_queue(&self) -> &'static str {
        RISK_SCORES_QUEUE
    }
}
