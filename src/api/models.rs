use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::domain::{AppError, ConversionResult};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

/// Response from the /convert endpoint.
///
/// The service uses the same body for success and error statuses, so the
/// `status` field decides the outcome rather than the HTTP status code.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConvertResponse {
    pub status: String,
    #[serde(default)]
    pub conversion_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ConvertResponse {
    /// `None` means the body claimed success but carried no conversion id.
    pub fn into_result(self) -> Option<ConversionResult> {
        if self.status != "success" {
            return Some(ConversionResult::Failure(AppError::rejected(self.message)));
        }

        let conversion_id = self.conversion_id?;
        Some(ConversionResult::Success {
            conversion_id,
            title: self.title.unwrap_or_default(),
        })
    }
}

/// Configuration for the conversion client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Read `WIZARDCONVERT_URL` and `WIZARDCONVERT_TIMEOUT_SECS`, keeping defaults
    /// for anything missing or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("WIZARDCONVERT_URL") {
            match Url::parse(&raw) {
                Ok(url) => config.base_url = url,
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid WIZARDCONVERT_URL"),
            }
        }

        if let Ok(raw) = std::env::var("WIZARDCONVERT_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.request_timeout = None,
                Ok(secs) => config.request_timeout = Some(Duration::from_secs(secs)),
                Err(e) => tracing::warn!(value = %raw, error = %e, "ignoring invalid WIZARDCONVERT_TIMEOUT_SECS"),
            }
        }

        config
    }
}
