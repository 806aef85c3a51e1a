use crate::dto::HealthRes;
use care_core::constants::SERVICE_NAME;
use chrono::{DateTime, Utc};

/// Health reporting shared by the REST API and the runner's startup log.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthService;

impl HealthService {
    /// The service is always healthy while it can answer; broker and FHIR state are reported
    /// alongside.
    pub fn check_health(
        rabbitmq_connected: bool,
        fhir_configured: bool,
        now: DateTime<Utc>,
    ) -> HealthRes {
        HealthRes {
            status: "healthy".into(),
            service: SERVICE_NAME.into(),
            timestamp: now,
            rabbitmq_connected,
            fhir_configured,
        }
    }
}
