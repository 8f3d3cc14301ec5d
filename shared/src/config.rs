use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::capabilities::{HttpError, ValidatedUrl, MAX_TIMEOUT_MS};
use crate::protocol::ArtifactHandle;
use crate::{
    DEFAULT_BASE_URL, DOWNLOAD_TIMEOUT, GENERATE_TIMEOUT, HEALTH_TIMEOUT, QR_TIMEOUT,
};

/// Where the generation service lives and how long each call may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub generate_timeout_ms: u64,
    pub qr_timeout_ms: u64,
    pub download_timeout_ms: u64,
    pub health_timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            generate_timeout_ms: duration_ms(GENERATE_TIMEOUT),
            qr_timeout_ms: duration_ms(QR_TIMEOUT),
            download_timeout_ms: duration_ms(DOWNLOAD_TIMEOUT),
            health_timeout_ms: duration_ms(HEALTH_TIMEOUT),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl ServiceConfig {
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Checks the base URL and that every stage timeout is one a request
    /// will accept.
    pub fn validate(&self) -> Result<(), HttpError> {
        ValidatedUrl::new(self.base_url.as_str())?;

        let stages = [
            ("generate", self.generate_timeout_ms),
            ("qr", self.qr_timeout_ms),
            ("download", self.download_timeout_ms),
            ("health", self.health_timeout_ms),
        ];
        for (stage, ms) in stages {
            if !(1..=MAX_TIMEOUT_MS).contains(&ms) {
                return Err(HttpError::InvalidRequest {
                    reason: format!(
                        "{stage} timeout of {ms}ms is outside 1..={MAX_TIMEOUT_MS}ms"
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn generate_url(&self) -> Result<ValidatedUrl, HttpError> {
        self.endpoint(&["api", "generate-prompts"])
    }

    pub fn qr_url(&self, artifact: &ArtifactHandle) -> Result<ValidatedUrl, HttpError> {
        self.endpoint(&["api", "generate-qr", artifact.as_str()])
    }

    pub fn download_url(&self, artifact: &ArtifactHandle) -> Result<ValidatedUrl, HttpError> {
        self.endpoint(&["api", "download-excel", artifact.as_str()])
    }

    pub fn health_url(&self) -> Result<ValidatedUrl, HttpError> {
        self.endpoint(&["api", "health"])
    }

    #[must_use]
    pub fn generate_timeout(&self) -> Duration {
        Duration::from_millis(self.generate_timeout_ms)
    }

    #[must_use]
    pub fn qr_timeout(&self) -> Duration {
        Duration::from_millis(self.qr_timeout_ms)
    }

    #[must_use]
    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }

    #[must_use]
    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded
    /// on its own, so a handle can never add path components.
    fn endpoint(&self, segments: &[&str]) -> Result<ValidatedUrl, HttpError> {
        let base = ValidatedUrl::new(self.base_url.as_str())?;
        let mut url = base.to_url()?;
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| HttpError::InvalidUrl {
                url: self.base_url.clone(),
                reason: "base URL cannot have path segments".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        ValidatedUrl::from_url(&url)
    }
}
