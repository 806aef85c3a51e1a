//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into core services, so request
//! handlers never read process-wide environment variables.

use crate::constants::{
    DEFAULT_FHIR_BASE_URL, MEMBER_DATA_FILENAME, POPULATION_ANALYTICS_FILENAME,
};
use crate::{CareError, CareResult};
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    samples_dir: PathBuf,
    financial_model_path: PathBuf,
    fhir_base_url: Option<String>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `fhir_base_url` is recorded for health reporting only; `None` means "not configured".
    pub fn new(
        samples_dir: PathBuf,
        financial_model_path: PathBuf,
        fhir_base_url: Option<String>,
    ) -> CareResult<Self> {
        if samples_dir.as_os_str().is_empty() {
            return Err(CareError::InvalidInput(
                "samples_dir cannot be empty".into(),
            ));
        }
        if financial_model_path.as_os_str().is_empty() {
            return Err(CareError::InvalidInput(
                "financial_model_path cannot be empty".into(),
            ));
        }
        if let Some(url) = &fhir_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CareError::InvalidInput(format!(
                    "FHIR base URL must be http(s): {url}"
                )));
            }
        }

        Ok(Self {
            samples_dir,
            financial_model_path,
            fhir_base_url,
        })
    }

    pub fn samples_dir(&self) -> &Path {
        &self.samples_dir
    }

    pub fn member_data_file(&self) -> PathBuf {
        self.samples_dir.join(MEMBER_DATA_FILENAME)
    }

    pub fn population_analytics_file(&self) -> PathBuf {
        self.samples_dir.join(POPULATION_ANALYTICS_FILENAME)
    }

    pub fn financial_model_file(&self) -> &Path {
        &self.financial_model_path
    }

    pub fn fhir_base_url(&self) -> Option<&str> {
        self.fhir_base_url.as_deref()
    }

    pub fn fhir_configured(&self) -> bool {
        self.fhir_base_url.is_some()
    }
}

/// Resolve the FHIR base URL from the raw value of `FHIR_BASE_URL`.
///
/// Unset falls back to the default server; a blank value disables it.
pub fn fhir_base_url_from_env_value(value: Option<String>) -> Option<String> {
    match value {
        None => Some(DEFAULT_FHIR_BASE_URL.to_string()),
        Some(v) if v.trim().is_empty() => None,
        Some(v) => Some(v.trim().trim_end_matches('/').to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_data_file_paths_from_samples_dir() {
        let cfg = CoreConfig::new(
            PathBuf::from("/data/samples"),
            PathBuf::from("model.json"),
            None,
        )
        .expect("config should be valid");

        assert_eq!(
            cfg.member_data_file(),
            PathBuf::from("/data/samples/enhanced_member_data.json")
        );
        assert_eq!(
            cfg.population_analytics_file(),
            PathBuf::from("/data/samples/population_analytics.json")
        );
        assert!(!cfg.fhir_configured());
    }

    #[test]
    fn rejects_empty_samples_dir() {
        let err = CoreConfig::new(PathBuf::new(), PathBuf::from("model.json"), None)
            .expect_err("empty samples dir should be rejected");
        assert!(matches!(err, CareError::InvalidInput(_)));
    }

    #[test]
    fn rejects_non_http_fhir_url() {
        let err = CoreConfig::new(
            PathBuf::from("samples"),
            PathBuf::from("model.json"),
            Some("ftp://fhir".into()),
        )
        .expect_err("non-http url should be rejected");
        assert!(matches!(err, CareError::InvalidInput(_)));
    }

    #[test]
    fn fhir_url_env_resolution() {
        assert_eq!(
            fhir_base_url_from_env_value(None).as_deref(),
            Some(DEFAULT_FHIR_BASE_URL)
        );
        assert_eq!(fhir_base_url_from_env_value(Some("  ".into())), None);
        assert_eq!(
            fhir_base_url_from_env_value(Some("http://localhost:8080/fhir/".into())).as_deref(),
            Some("http://localhost:8080/fhir")
        );
    }
}
