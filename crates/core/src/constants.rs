//! Constants used throughout the care core crate.

/// Service name reported by health checks and used as the AMQP consumer tag.
pub const SERVICE_NAME: &str = "care-orchestration";

/// Default directory holding the sample data files when none is configured.
pub const DEFAULT_SAMPLES_DIR: &str = "samples";

/// Filename of the flat JSON array of member/gap records.
pub const MEMBER_DATA_FILENAME: &str = "enhanced_member_data.json";

/// Filename of the precomputed population analytics (provider section).
pub const POPULATION_ANALYTICS_FILENAME: &str = "population_analytics.json";

/// Default location of the optional financial impact model.
pub const DEFAULT_FINANCIAL_MODEL_PATH: &str = "financial_impact_model.json";

/// FHIR server recorded in configuration when none is given. Resources are never sent there.
pub const DEFAULT_FHIR_BASE_URL: &str = "https://hapi.fhir.org/baseR4";

/// Alert type stamped on high-risk alert payloads.
pub const HIGH_RISK_ALERT_TYPE: &str = "HIGH_RISK_CARE_GAP";

/// Who closes care gaps through the API.
pub const GAP_CLOSED_BY: &str = "Care Manager";
