//! Connection settings for the Azure DevOps REST API.

use std::time::Duration;

use reqwest::Url;

use crate::DevOpsError;

/// Organization-hosting root used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";

/// REST API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "4.1-preview.1";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach Azure DevOps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevOpsConfig {
    /// Root URL; the organization name is appended as the first path segment.
    pub base_url: Url,
    /// Value of the `api-version` query parameter.
    pub api_version: String,
    /// Timeout applied to each HTTP request.
    pub timeout: Duration,
}

impl DevOpsConfig {
    /// Replaces the base URL, e.g. for an on-premises server or a test double.
    ///
    /// Fails if `base_url` is not an absolute `http`/`https` URL.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, DevOpsError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Replaces the API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Replaces the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for DevOpsConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL)
                .unwrap_or_else(|e| unreachable!("default base URL is valid: {e}")),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, DevOpsError> {
    let invalid = |message: String| DevOpsError::InvalidBaseUrl {
        url: raw.to_string(),
        message,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry path segments".to_string()));
    }
    Ok(url)
}
