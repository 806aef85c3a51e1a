//! # Care Broker
//!
//! AMQP transport for care orchestration.
//!
//! Contains:
//! - [`BrokerConfig`]: connection settings and the exchange/queue topology
//! - [`AmqpBroker`]: connection lifecycle and topology declaration
//! - [`AmqpPublisher`]: the AMQP [`care_core::EventPublisher`]
//! - [`RiskScoreConsumer`]: orchestrates every risk-score delivery
//!
//! A broker that cannot be reached is not fatal: [`connect_or_disconnected`] degrades to
//! [`care_core::DisconnectedPublisher`].

pub mod config;
pub mod connection;
pub mod consumer;
pub mod error;
pub mod publisher;

pub use config::BrokerConfig;
pub use connection::{connect_or_disconnected, AmqpBroker};
pub use consumer::{decode_risk_score, RiskScoreConsumer};
pub use error::{BrokerError, BrokerResult};
pub use publisher::AmqpPublisher;
