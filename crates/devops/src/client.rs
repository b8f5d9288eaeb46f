//! [`DevOpsClient`]: the REST implementation of [`ServiceEndpointClient`].

use async_trait::async_trait;
use endpoints::{
    Credentials, EndpointName, OrganizationName, ProjectId, ProjectName, ProjectReference,
    ServiceEndpoint, ServiceEndpointClient, ServiceEndpointError,
};
use reqwest::{header, Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{DevOpsConfig, DevOpsError};

/// Longest slice of a non-JSON error body carried into an error message.
const MAX_ERROR_BODY: usize = 512;

/// Envelope used by every Azure DevOps list response.
#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// Shape of an Azure DevOps error body; only the message is used.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Azure DevOps client scoped to one organization.
///
/// Holds the caller's [`Credentials`] and attaches them to every request.
#[derive(Debug, Clone)]
pub struct DevOpsClient {
    http: Client,
    base_url: Url,
    api_version: String,
    organization: OrganizationName,
    credentials: Credentials,
}

impl DevOpsClient {
    /// Creates a client for `organization` authenticating with `credentials`.
    pub fn new(
        config: &DevOpsConfig,
        organization: OrganizationName,
        credentials: Credentials,
    ) -> Result<Self, DevOpsError> {
        if config.base_url.cannot_be_a_base() {
            return Err(DevOpsError::InvalidBaseUrl {
                url: config.base_url.to_string(),
                message: "URL cannot carry path segments".to_string(),
            });
        }

        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(DevOpsError::ClientBuild)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_version: config.api_version.clone(),
            organization,
            credentials,
        })
    }

    /// The organization this client is scoped to.
    pub fn organization(&self) -> &OrganizationName {
        &self.organization
    }

    /// Builds `{base}/{organization}/{segments...}?api-version=...`.
    ///
    /// Segments are percent-encoded individually, so project names with
    /// spaces or slashes stay a single segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push(self.organization.as_str())
                .extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("api-version", &self.api_version);
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::PersonalAccessToken(token) => request.basic_auth("", Some(token)),
            Credentials::BearerToken(token) => request.bearer_auth(token),
        }
    }

    /// Sends `request` and decodes a JSON success body.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<T, DevOpsError> {
        debug!(method, url = %url, "Sending Azure DevOps request");

        let response = self
            .authorize(request)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|source| DevOpsError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!(method, url = %url, status = status.as_u16(), "Azure DevOps responded");

        if status == StatusCode::NON_AUTHORITATIVE_INFORMATION {
            return Err(DevOpsError::SignInRequired {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DevOpsError::Status {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        response.json::<T>().await.map_err(|source| DevOpsError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

/// Picks the most useful message out of an error response.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody {
        message: Some(message),
    }) = serde_json::from_str::<ErrorBody>(body)
    {
        return message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string();
    }

    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

#[async_trait]
impl ServiceEndpointClient for DevOpsClient {
    #[instrument(skip(self), fields(organization = %self.organization))]
    async fn get_project_by_name(
        &self,
        project: &ProjectName,
    ) -> Result<ProjectReference, ServiceEndpointError> {
        let url = self.url(&["_apis", "projects", project.as_str()]);

        match self
            .execute::<ProjectReference>("GET", &url, self.http.get(url.clone()))
            .await
        {
            Ok(reference) => Ok(reference),
            Err(DevOpsError::Status { status: 404, .. }) => {
                Err(ServiceEndpointError::ProjectNotFound {
                    project: project.clone(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self), fields(organization = %self.organization))]
    async fn get_service_endpoints_by_names(
        &self,
        project: &ProjectName,
        names: &[EndpointName],
    ) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError> {
        let mut url = self.url(&[project.as_str(), "_apis", "serviceendpoint", "endpoints"]);
        let joined = names
            .iter()
            .map(EndpointName::as_str)
            .collect::<Vec<_>>()
            .join(",");
        url.query_pairs_mut().append_pair("endpointNames", &joined);

        let list: ListResponse<ServiceEndpoint> = self
            .execute("GET", &url, self.http.get(url.clone()))
            .await?;
        Ok(list.value)
    }

    #[instrument(
        skip(self, endpoint),
        fields(organization = %self.organization, endpoint = %endpoint.name, endpoint_type = %endpoint.endpoint_type)
    )]
    async fn create_service_endpoint(
        &self,
        endpoint: &ServiceEndpoint,
        project: ProjectId,
    ) -> Result<ServiceEndpoint, ServiceEndpointError> {
        let project_id = project.to_string();
        let url = self.url(&[project_id.as_str(), "_apis", "serviceendpoint", "endpoints"]);

        let created = self
            .execute("POST", &url, self.http.post(url.clone()).json(endpoint))
            .await?;
        Ok(created)
    }

    #[instrument(skip(self), fields(organization = %self.organization))]
    async fn get_service_endpoints(
        &self,
        project: ProjectId,
    ) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError> {
        let project_id = project.to_string();
        let url = self.url(&[project_id.as_str(), "_apis", "serviceendpoint", "endpoints"]);

        let list: ListResponse<ServiceEndpoint> = self
            .execute("GET", &url, self.http.get(url.clone()))
            .await?;
        Ok(list.value)
    }
}
