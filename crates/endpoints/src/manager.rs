//! The service endpoint manager.
//!
//! Every operation is a single pass: build a request from the arguments,
//! call the ports in order, return the result. Nothing is cached between
//! calls and nothing is retried.

use tracing::{debug, info, instrument, warn};

use crate::naming::{NamingConvention, PIPELINE_SERVICE};
use crate::ports::{IdentityProvider, ServiceEndpointClient};
use crate::{
    EndpointName, OrganizationName, ProjectName, RepositoryName, ServiceEndpoint,
    ServiceEndpointError,
};

/// Manages the service endpoints of one Azure DevOps project.
///
/// `C` talks to the DevOps service (and owns the caller's credentials);
/// `I` talks to the signed-in cloud account and is only used by
/// [`create_azure_service_principal_connection`](Self::create_azure_service_principal_connection).
#[derive(Debug)]
pub struct ServiceEndpointManager<C, I> {
    organization: OrganizationName,
    project: ProjectName,
    naming: NamingConvention,
    client: C,
    identity: I,
}

impl<C, I> ServiceEndpointManager<C, I>
where
    C: ServiceEndpointClient,
    I: IdentityProvider,
{
    /// Creates a manager for `project` in `organization` using the default
    /// [`NamingConvention`].
    pub fn new(organization: OrganizationName, project: ProjectName, client: C, identity: I) -> Self {
        Self {
            organization,
            project,
            naming: NamingConvention::default(),
            client,
            identity,
        }
    }

    /// Replaces the naming convention.
    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    /// The organization this manager is scoped to.
    pub fn organization(&self) -> &OrganizationName {
        &self.organization
    }

    /// The project this manager is scoped to.
    pub fn project(&self) -> &ProjectName {
        &self.project
    }

    /// The remote client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The identity provider.
    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// The derived endpoint name for `repository`'s pipeline connection.
    ///
    /// Both the Azure create path and [`lookup`](Self::lookup) use this name.
    pub fn pipeline_endpoint_name(&self, repository: &RepositoryName) -> EndpointName {
        self.naming
            .endpoint_name(&self.organization, &self.project, repository, PIPELINE_SERVICE)
    }

    /// Looks up the pipeline endpoint for `repository` by its derived name.
    ///
    /// Returns `Ok(None)` if no such endpoint exists.
    #[instrument(skip(self), fields(organization = %self.organization, project = %self.project))]
    pub async fn lookup(
        &self,
        repository: &RepositoryName,
    ) -> Result<Option<ServiceEndpoint>, ServiceEndpointError> {
        let name = self.pipeline_endpoint_name(repository);
        debug!(endpoint = %name, "Looking up service endpoint");

        let matches = self
            .client
            .get_service_endpoints_by_names(&self.project, std::slice::from_ref(&name))
            .await?;

        if matches.len() > 1 {
            warn!(
                endpoint = %name,
                count = matches.len(),
                "Multiple service endpoints share a derived name; using the first"
            );
        }

        Ok(matches.into_iter().next())
    }

    /// Creates a GitHub connection authenticated with a personal access token.
    #[instrument(skip(self, access_token), fields(organization = %self.organization, project = %self.project))]
    pub async fn create_github_connection(
        &self,
        name: &EndpointName,
        access_token: &str,
    ) -> Result<ServiceEndpoint, ServiceEndpointError> {
        let project = self.client.get_project_by_name(&self.project).await?;

        let request = ServiceEndpoint::github(name.clone(), access_token);
        let created = self.client.create_service_endpoint(&request, project.id).await?;

        info!(endpoint = %created.name, project_id = %project.id, "Created GitHub service endpoint");
        Ok(created)
    }

    /// Creates an Azure Resource Manager connection backed by a new service
    /// principal on the signed-in subscription.
    ///
    /// The principal is named with the derived pipeline name for
    /// `repository`; the endpoint takes the principal's display name. The
    /// caller must hold `Microsoft.Authorization/roleAssignments/write` on
    /// the subscription.
    #[instrument(skip(self), fields(organization = %self.organization, project = %self.project))]
    pub async fn create_azure_service_principal_connection(
        &self,
        repository: &RepositoryName,
    ) -> Result<ServiceEndpoint, ServiceEndpointError> {
        let project = self.client.get_project_by_name(&self.project).await?;

        let account = self.identity.current_account().await?;
        debug!(subscription_id = %account.id, "Resolved current subscription");

        let principal_name = self.pipeline_endpoint_name(repository);
        let principal = self.identity.create_service_principal(&principal_name).await?;
        debug!(
            app_id = %principal.app_id,
            display_name = %principal.display_name,
            "Created service principal"
        );

        let request = ServiceEndpoint::azure_rm(&account, &principal).ok_or_else(|| {
            ServiceEndpointError::MalformedIdentityOutput {
                command: format!("create service principal {principal_name}"),
                message: "empty displayName".to_string(),
            }
        })?;
        let created = self.client.create_service_endpoint(&request, project.id).await?;

        info!(
            endpoint = %created.name,
            project_id = %project.id,
            subscription_id = %account.id,
            "Created Azure Resource Manager service endpoint"
        );
        Ok(created)
    }

    /// Lists every service endpoint in the project, unfiltered, in the order
    /// the remote service returns them.
    #[instrument(skip(self), fields(organization = %self.organization, project = %self.project))]
    pub async fn list_connections(&self) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError> {
        let project = self.client.get_project_by_name(&self.project).await?;
        let endpoints = self.client.get_service_endpoints(project.id).await?;
        debug!(count = endpoints.len(), "Listed service endpoints");
        Ok(endpoints)
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
