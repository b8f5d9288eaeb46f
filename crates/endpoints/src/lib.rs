//! Azure DevOps service endpoint domain.
//!
//! This crate contains the domain types, the derived naming convention, the
//! port traits, and the [`ServiceEndpointManager`] that creates, lists, and
//! looks up service endpoints (service connections) in a project.
//! Infrastructure crates implement the ports; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; `devops` (REST) and `azure-cli` (process)
//! define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype names and ids (`ProjectName`, `ProjectId`, etc.) |
//! | [`types`] | Endpoint, authorization, credential, and identity value types |
//! | [`naming`] | The derived endpoint name convention |
//! | [`errors`] | [`ServiceEndpointError`] and remote error classification |
//! | [`ports`] | [`ServiceEndpointClient`] and [`IdentityProvider`] traits |
//! | [`manager`] | [`ServiceEndpointManager`] |

pub mod errors;
pub mod identifiers;
pub mod manager;
pub mod naming;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{RemoteError, RemoteErrorKind, ServiceEndpointError};
pub use identifiers::{
    EndpointId, EndpointName, OrganizationName, ProjectId, ProjectName, RepositoryName,
};
pub use manager::ServiceEndpointManager;
pub use naming::{NamingConvention, DEFAULT_ENDPOINT_DOMAIN, PIPELINE_SERVICE};
pub use ports::{IdentityProvider, ServiceEndpointClient};
pub use types::{
    AccountInfo, AuthorizationScheme, Credentials, EndpointAuthorization, EndpointType,
    ProjectReference, ServiceEndpoint, ServicePrincipal,
};
