//! Port traits implemented by the infrastructure crates.
//!
//! The manager depends only on these two traits:
//!
//! - [`ServiceEndpointClient`]: the DevOps service-endpoint API, implemented
//!   over REST by the `devops` crate.
//! - [`IdentityProvider`]: the cloud account tooling, implemented by the
//!   `azure-cli` crate by running `az`. A direct SDK implementation can
//!   replace it without any change to the manager.

use async_trait::async_trait;

use crate::{
    AccountInfo, EndpointName, ProjectId, ProjectName, ProjectReference, ServiceEndpoint,
    ServiceEndpointError, ServicePrincipal,
};

/// Access to the project-scoped service-endpoint API of one organization.
#[async_trait]
pub trait ServiceEndpointClient: Send + Sync {
    /// Resolves a project name to its id.
    ///
    /// Fails with [`ServiceEndpointError::ProjectNotFound`] if the project
    /// does not exist or is not visible.
    async fn get_project_by_name(
        &self,
        project: &ProjectName,
    ) -> Result<ProjectReference, ServiceEndpointError>;

    /// Returns the endpoints in `project` whose names exactly match one of
    /// `names`. An empty vector is a normal result.
    async fn get_service_endpoints_by_names(
        &self,
        project: &ProjectName,
        names: &[EndpointName],
    ) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError>;

    /// Creates `endpoint` in the project and returns the stored representation.
    async fn create_service_endpoint(
        &self,
        endpoint: &ServiceEndpoint,
        project: ProjectId,
    ) -> Result<ServiceEndpoint, ServiceEndpointError>;

    /// Returns every endpoint in the project, in the order the service reports them.
    async fn get_service_endpoints(
        &self,
        project: ProjectId,
    ) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError>;
}

/// Access to the signed-in cloud account.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the subscription the tooling is currently signed in to.
    async fn current_account(&self) -> Result<AccountInfo, ServiceEndpointError>;

    /// Creates a service principal named `name` with a role assignment on
    /// the current subscription, and returns its credentials.
    ///
    /// Requires `Microsoft.Authorization/roleAssignments/write` on the
    /// subscription.
    async fn create_service_principal(
        &self,
        name: &EndpointName,
    ) -> Result<ServicePrincipal, ServiceEndpointError>;
}
