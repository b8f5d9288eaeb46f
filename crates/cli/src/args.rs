//! Command-line arguments. Every connection setting can also come from the
//! environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Manage Azure DevOps service endpoints (service connections) for a project.
#[derive(Parser)]
#[command(name = "svc-endpoints", version, about)]
pub struct Cli {
    /// Azure DevOps organization name.
    #[arg(long, env = "AZURE_DEVOPS_ORG")]
    pub organization: String,

    /// Project name within the organization.
    #[arg(long, env = "AZURE_DEVOPS_PROJECT")]
    pub project: String,

    /// Personal access token used to call Azure DevOps.
    #[arg(long, env = "AZURE_DEVOPS_EXT_PAT", hide_env_values = true)]
    pub pat: Option<String>,

    /// Azure AD bearer token used to call Azure DevOps (when no PAT is given).
    #[arg(long, env = "AZURE_DEVOPS_BEARER_TOKEN", hide_env_values = true)]
    pub bearer_token: Option<String>,

    /// Organization-hosting root URL.
    #[arg(long, env = "AZURE_DEVOPS_BASE_URL", default_value = devops::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// REST `api-version` sent with every request.
    #[arg(long, env = "AZURE_DEVOPS_API_VERSION", default_value = devops::DEFAULT_API_VERSION)]
    pub api_version: String,

    /// Per-request timeout in seconds.
    #[arg(long, env = "AZURE_DEVOPS_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Domain segment of derived endpoint names.
    #[arg(long, env = "SERVICE_ENDPOINT_DOMAIN", default_value = endpoints::DEFAULT_ENDPOINT_DOMAIN)]
    pub endpoint_domain: String,

    /// Azure CLI executable (`az`, or `az.cmd` on Windows).
    #[arg(long, env = "AZ_PROGRAM", default_value = azure_cli::DEFAULT_PROGRAM)]
    pub az_program: PathBuf,

    /// Log output format (logs go to stderr).
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Look up the pipeline connection derived for a repository.
    Lookup {
        #[arg(long)]
        repository: String,
    },

    /// Create a GitHub connection authenticated with a personal access token.
    CreateGithub {
        /// Connection name.
        #[arg(long)]
        name: String,
        /// GitHub personal access token.
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Create an Azure Resource Manager connection backed by a new service
    /// principal on the signed-in subscription.
    CreateAzure {
        #[arg(long)]
        repository: String,
    },

    /// List every connection in the project.
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Cli {
        let mut argv = vec![
            "svc-endpoints",
            "--organization",
            "contoso",
            "--project",
            "proj1",
            "--pat",
            "test-pat",
        ];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn lookup_takes_a_repository() {
        let cli = parse(&["lookup", "--repository", "repoA"]);
        assert_eq!(cli.organization, "contoso");
        assert_eq!(cli.project, "proj1");
        assert_eq!(
            cli.command,
            Command::Lookup {
                repository: "repoA".to_string()
            }
        );
    }

    #[test]
    fn create_github_takes_name_and_token() {
        let cli = parse(&["create-github", "--name", "gh", "--token", "ghp_x"]);
        assert_eq!(
            cli.command,
            Command::CreateGithub {
                name: "gh".to_string(),
                token: "ghp_x".to_string()
            }
        );
    }

    #[test]
    fn settings_can_be_overridden_by_flags() {
        let cli = parse(&[
            "--base-url",
            "https://tfs.contoso.local/tfs",
            "--endpoint-domain",
            "example.test",
            "--log-format",
            "json",
            "list",
        ]);
        assert_eq!(cli.base_url, "https://tfs.contoso.local/tfs");
        assert_eq!(cli.endpoint_domain, "example.test");
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.command, Command::List);
    }

    #[test]
    fn a_subcommand_is_required() {
        let result = Cli::try_parse_from([
            "svc-endpoints",
            "--organization",
            "contoso",
            "--project",
            "proj1",
        ]);
        assert!(result.is_err());
    }
}
