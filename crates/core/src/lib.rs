//! # Care Core
//!
//! Core business logic for the care orchestration service.
//!
//! This crate contains the care-gap orchestration pipeline and the read-only data operations
//! behind the HTTP API:
//! - Care-gap derivation (priority mapping, intervention due-date table)
//! - Orchestration: FHIR synthesis → care gaps → event publication
//! - The [`EventPublisher`] seam and its in-process implementations
//! - Member sample-file access and derived analytics
//!
//! **No transport concerns**: HTTP servers and AMQP connections belong in `api-rest` and
//! `care-broker`.

pub mod actions;
pub mod analytics;
pub mod care_gap;
pub mod config;
pub mod constants;
pub mod data_files;
pub mod error;
pub mod members;
pub mod model;
pub mod orchestrator;
pub mod publisher;

pub use care_gap::{CareGap, GapPriority, GapStatus};
pub use config::CoreConfig;
pub use error::{CareError, CareResult};
pub use members::{MemberDataSource, MemberRecord};
pub use model::{OrchestrationRequest, OrchestrationResult};
pub use orchestrator::CareOrchestrator;
pub use publisher::{
    CareEvent, DisconnectedPublisher, EventPublisher, InMemoryPublisher, PublishError, Topic,
};

pub use constants::DEFAULT_SAMPLES_DIR;
