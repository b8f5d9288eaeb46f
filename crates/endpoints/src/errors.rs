//! Error types for the service endpoint domain.
//!
//! [`ServiceEndpointError`] is the single error type returned by every
//! [`crate::ServiceEndpointManager`] operation and by the port traits. The
//! infrastructure crates define their own error enums and convert into it.
//!
//! Three families are kept distinct:
//!
//! - **External process** failures: the cloud CLI could not be run, exited
//!   non-zero, or printed something that is not the expected JSON object.
//! - **Remote** failures: the DevOps service rejected a call or could not be
//!   reached. These are surfaced as reported; nothing is retried.
//! - **Not found** on lookup is *not* an error; it is `Ok(None)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ProjectName;

// ---------------------------------------------------------------------------
// Remote errors
// ---------------------------------------------------------------------------

/// Classification of a failed remote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteErrorKind {
    /// The credential was missing, expired, or rejected (HTTP 401).
    Authentication,
    /// The credential is valid but lacks permission (HTTP 403).
    Authorization,
    /// The addressed resource does not exist (HTTP 404).
    NotFound,
    /// The request conflicts with existing state, e.g. a duplicate name (HTTP 409).
    Conflict,
    /// The request never produced an HTTP response (DNS, TLS, timeout).
    Transport,
    /// A success response whose body could not be decoded.
    InvalidResponse,
    /// Any other non-success status.
    Other,
}

/// A remote request failure, as reported by the DevOps service.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?} error from Azure DevOps{}: {message}", status_suffix(.status))]
pub struct RemoteError {
    /// What kind of failure this is.
    pub kind: RemoteErrorKind,
    /// HTTP status, when a response was received.
    pub status: Option<u16>,
    /// Message from the service body, or a description of the transport failure.
    pub message: String,
}

impl RemoteError {
    /// Creates a [`RemoteError`].
    pub fn new(kind: RemoteErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Manager-level errors
// ---------------------------------------------------------------------------

/// Errors returned by service endpoint operations.
#[derive(Debug, Error, Serialize, Deserialize)]
pub enum ServiceEndpointError {
    /// The cloud CLI could not be started at all (not installed, not on `PATH`).
    #[error("Could not run `{command}`: {message}")]
    IdentityCommandUnavailable {
        /// The command line that was attempted.
        command: String,
        /// Operating-system error text.
        message: String,
    },

    /// The cloud CLI ran but exited unsuccessfully.
    #[error("`{command}` failed with exit code {exit_code:?}: {stderr}")]
    IdentityCommandFailed {
        /// The command line that was run.
        command: String,
        /// Process exit code; `None` if terminated by a signal.
        exit_code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The cloud CLI exited successfully but its output was not a JSON
    /// object with the required fields.
    #[error("`{command}` produced unexpected output: {message}")]
    MalformedIdentityOutput {
        /// The command line that was run.
        command: String,
        /// What was wrong with the output.
        message: String,
    },

    /// The DevOps service rejected or failed a request.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The configured project does not exist in the organization, or is not
    /// visible to the supplied credential.
    #[error("Project '{project}' was not found")]
    ProjectNotFound {
        /// The project name that was looked up.
        project: ProjectName,
    },

    /// A name, URL, or other setting is unusable.
    #[error("Configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ServiceEndpointError {
    /// Returns the remote failure kind, if this error came from the DevOps service.
    pub fn remote_kind(&self) -> Option<RemoteErrorKind> {
        match self {
            ServiceEndpointError::Remote(err) => Some(err.kind),
            _ => None,
        }
    }

    /// Returns `true` if this error came from running the cloud CLI.
    pub fn is_external_process(&self) -> bool {
        matches!(
            self,
            ServiceEndpointError::IdentityCommandUnavailable { .. }
                | ServiceEndpointError::IdentityCommandFailed { .. }
                | ServiceEndpointError::MalformedIdentityOutput { .. }
        )
    }
}
