//! Errors raised while talking to the Azure DevOps REST API.

use endpoints::{RemoteError, RemoteErrorKind, ServiceEndpointError};
use thiserror::Error;

/// Failures of the REST adapter.
#[derive(Debug, Error)]
pub enum DevOpsError {
    /// The configured base URL is unusable.
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// The HTTP client could not be constructed (e.g. TLS backend failure).
    #[error("Could not build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// No HTTP response was received.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{method} {url} returned HTTP {status}: {message}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
    },

    /// The service answered with its sign-in page instead of JSON, which is
    /// how Azure DevOps reports a rejected personal access token.
    #[error("{url} redirected to sign-in; the credential was not accepted")]
    SignInRequired { url: String },

    /// A success response whose body is not the expected JSON.
    #[error("Could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<DevOpsError> for ServiceEndpointError {
    fn from(err: DevOpsError) -> Self {
        match err {
            DevOpsError::InvalidBaseUrl { .. } | DevOpsError::ClientBuild(_) => {
                ServiceEndpointError::ConfigurationError {
                    message: err.to_string(),
                }
            }
            DevOpsError::Transport { .. } => ServiceEndpointError::Remote(RemoteError::new(
                RemoteErrorKind::Transport,
                None,
                err.to_string(),
            )),
            DevOpsError::Status {
                status, message, ..
            } => ServiceEndpointError::Remote(RemoteError::new(
                kind_for_status(status),
                Some(status),
                message,
            )),
            DevOpsError::SignInRequired { .. } => ServiceEndpointError::Remote(RemoteError::new(
                RemoteErrorKind::Authentication,
                Some(203),
                err.to_string(),
            )),
            DevOpsError::Decode { .. } => ServiceEndpointError::Remote(RemoteError::new(
                RemoteErrorKind::InvalidResponse,
                None,
                err.to_string(),
            )),
        }
    }
}

fn kind_for_status(status: u16) -> RemoteErrorKind {
    match status {
        401 => RemoteErrorKind::Authentication,
        403 => RemoteErrorKind::Authorization,
        404 => RemoteErrorKind::NotFound,
        409 => RemoteErrorKind::Conflict,
        _ => RemoteErrorKind::Other,
    }
}
