//! Cloud identity infrastructure adapter.
//!
//! Implements the [`endpoints::IdentityProvider`] trait by running the Azure
//! CLI and decoding its JSON output:
//!
//! | Trait method | Command |
//! |--------------|---------|
//! | `current_account` | `az account show --output json` |
//! | `create_service_principal` | `az ad sp create-for-rbac --output json --name <name>` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Process spawning, exit-status checks and output
//! decoding live here. The [`endpoints`] crate sees only
//! [`endpoints::IdentityProvider`]; a direct Azure SDK implementation can
//! replace this crate without touching the manager.
//!
//! The CLI must already be signed in (`az login`). Creating a service
//! principal additionally requires `Microsoft.Authorization/roleAssignments/write`
//! on the subscription.

mod errors;
mod provider;

pub use errors::AzureCliError;
pub use provider::{AzureCliConfig, AzureCliIdentityProvider, DEFAULT_PROGRAM};
