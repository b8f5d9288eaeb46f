//! Errors raised while running the Azure CLI.

use endpoints::ServiceEndpointError;
use thiserror::Error;

/// Failures of the CLI adapter.
#[derive(Debug, Error)]
pub enum AzureCliError {
    /// The program could not be started.
    #[error("Could not run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The program exited unsuccessfully.
    #[error("`{command}` failed with exit code {exit_code:?}: {stderr}")]
    Exit {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Standard output was not the expected JSON object.
    #[error("`{command}` produced unexpected output: {source}")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<AzureCliError> for ServiceEndpointError {
    fn from(err: AzureCliError) -> Self {
        match err {
            AzureCliError::Spawn { command, source } => {
                ServiceEndpointError::IdentityCommandUnavailable {
                    command,
                    message: source.to_string(),
                }
            }
            AzureCliError::Exit {
                command,
                exit_code,
                stderr,
            } => ServiceEndpointError::IdentityCommandFailed {
                command,
                exit_code,
                stderr,
            },
            AzureCliError::Parse { command, source } => {
                ServiceEndpointError::MalformedIdentityOutput {
                    command,
                    message: source.to_string(),
                }
            }
        }
    }
}
