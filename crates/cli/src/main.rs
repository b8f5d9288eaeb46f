//! Service endpoint CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration** — flags and environment variables (see [`args`]).
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    `EnvFilter` (`RUST_LOG`, default `info`) and a text or JSON layer on
//!    stderr. All `tracing` spans and events emitted by every crate in the
//!    workspace flow through this layer.
//! 3. **Construct infrastructure** — create the `DevOpsClient` with the
//!    caller's credentials and the `AzureCliIdentityProvider`, and inject them
//!    into a `ServiceEndpointManager`.
//! 4. **Run one operation** and print its result as JSON on stdout.
//!    Authorization parameters are never printed.

mod args;

use std::time::Duration;

use anyhow::{bail, Context, Result};
use azure_cli::{AzureCliConfig, AzureCliIdentityProvider};
use clap::Parser;
use devops::{DevOpsClient, DevOpsConfig};
use endpoints::{
    Credentials, EndpointName, NamingConvention, OrganizationName, ProjectName, RepositoryName,
    ServiceEndpoint, ServiceEndpointManager,
};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, Command, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);
    tracing::debug!(organization = %cli.organization, project = %cli.project, "Starting");

    let manager = build_manager(&cli)?;

    match cli.command {
        Command::Lookup { repository } => {
            let repository = required(RepositoryName::new(repository), "repository")?;
            let found = manager
                .lookup(&repository)
                .await
                .with_context(|| format!("looking up the pipeline connection for '{repository}'"))?;
            print_json(&found.map(redacted))?;
        }
        Command::CreateGithub { name, token } => {
            let name = required(EndpointName::new(name), "name")?;
            let created = manager
                .create_github_connection(&name, &token)
                .await
                .with_context(|| format!("creating GitHub connection '{name}'"))?;
            print_json(&redacted(created))?;
        }
        Command::CreateAzure { repository } => {
            let repository = required(RepositoryName::new(repository), "repository")?;
            let created = manager
                .create_azure_service_principal_connection(&repository)
                .await
                .with_context(|| format!("creating Azure connection for '{repository}'"))?;
            print_json(&redacted(created))?;
        }
        Command::List => {
            let listed = manager
                .list_connections()
                .await
                .context("listing service connections")?;
            print_json(&listed.into_iter().map(redacted).collect::<Vec<_>>())?;
        }
    }

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn build_manager(
    cli: &Cli,
) -> Result<ServiceEndpointManager<DevOpsClient, AzureCliIdentityProvider>> {
    let organization = required(OrganizationName::new(cli.organization.clone()), "organization")?;
    let project = required(ProjectName::new(cli.project.clone()), "project")?;
    let credentials = credentials(cli.pat.clone(), cli.bearer_token.clone())?;

    let config = DevOpsConfig::default()
        .with_base_url(&cli.base_url)?
        .with_api_version(cli.api_version.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = DevOpsClient::new(&config, organization.clone(), credentials)
        .context("building the Azure DevOps client")?;

    let identity = AzureCliIdentityProvider::new(AzureCliConfig {
        program: cli.az_program.clone(),
    });

    let naming = NamingConvention::new(cli.endpoint_domain.clone())
        .context("--endpoint-domain must not be empty")?;

    Ok(ServiceEndpointManager::new(organization, project, client, identity).with_naming(naming))
}

/// Picks the credential to use; a PAT wins over a bearer token.
fn credentials(pat: Option<String>, bearer_token: Option<String>) -> Result<Credentials> {
    match (pat.filter(|p| !p.is_empty()), bearer_token.filter(|t| !t.is_empty())) {
        (Some(pat), _) => Ok(Credentials::PersonalAccessToken(pat)),
        (None, Some(token)) => Ok(Credentials::BearerToken(token)),
        (None, None) => bail!(
            "no Azure DevOps credential: set AZURE_DEVOPS_EXT_PAT or AZURE_DEVOPS_BEARER_TOKEN"
        ),
    }
}

fn required<T>(value: Option<T>, what: &str) -> Result<T> {
    value.with_context(|| format!("{what} must not be empty"))
}

fn redacted(mut endpoint: ServiceEndpoint) -> ServiceEndpoint {
    endpoint.authorization = None;
    endpoint
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
