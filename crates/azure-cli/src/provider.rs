//! [`AzureCliIdentityProvider`]: the `az`-backed implementation of [`IdentityProvider`].

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use endpoints::{AccountInfo, EndpointName, IdentityProvider, ServiceEndpointError, ServicePrincipal};
use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::AzureCliError;

/// Program name used when none is configured.
///
/// On Windows the CLI is installed as a `.cmd` shim, which `CreateProcess`
/// only finds when the extension is spelled out.
#[cfg(windows)]
pub const DEFAULT_PROGRAM: &str = "az.cmd";

/// Program name used when none is configured.
#[cfg(not(windows))]
pub const DEFAULT_PROGRAM: &str = "az";

/// How to invoke the Azure CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureCliConfig {
    /// Path or name of the `az` executable. Resolved through `PATH` when bare.
    pub program: PathBuf,
}

impl Default for AzureCliConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
        }
    }
}

/// Reads the signed-in subscription and creates service principals by
/// running the Azure CLI.
///
/// Arguments are passed directly to the program, never through a shell.
#[derive(Debug, Clone, Default)]
pub struct AzureCliIdentityProvider {
    config: AzureCliConfig,
}

impl AzureCliIdentityProvider {
    /// Creates a provider using `config`.
    pub fn new(config: AzureCliConfig) -> Self {
        Self { config }
    }

    /// Runs the CLI with `args` and decodes its standard output as `T`.
    async fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T, AzureCliError> {
        let command = self.command_line(args);
        debug!(command = %command, "Running Azure CLI");

        let output = Command::new(&self.config.program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AzureCliError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(AzureCliError::Exit {
                command,
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(command, &output.stdout)
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut line = self.config.program.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Decodes a single JSON object from a command's standard output.
fn parse_output<T: DeserializeOwned>(command: String, stdout: &[u8]) -> Result<T, AzureCliError> {
    serde_json::from_slice(stdout).map_err(|source| AzureCliError::Parse { command, source })
}

#[async_trait]
impl IdentityProvider for AzureCliIdentityProvider {
    #[instrument(skip(self))]
    async fn current_account(&self) -> Result<AccountInfo, ServiceEndpointError> {
        let account: AccountInfo = self
            .run_json(&["account", "show", "--output", "json"])
            .await?;
        Ok(account)
    }

    #[instrument(skip(self))]
    async fn create_service_principal(
        &self,
        name: &EndpointName,
    ) -> Result<ServicePrincipal, ServiceEndpointError> {
        let principal: ServicePrincipal = self
            .run_json(&[
                "ad",
                "sp",
                "create-for-rbac",
                "--output",
                "json",
                "--name",
                name.as_str(),
            ])
            .await?;
        Ok(principal)
    }
}
