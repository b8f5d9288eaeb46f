//! Shared value types for the service endpoint domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structure: an endpoint's authorization record, its free-form data mapping,
//! and the identity records returned by the cloud account tooling. They
//! serialise to the camelCase JSON shape the Azure DevOps REST API speaks, so
//! the infrastructure crates can send and receive them without a second set
//! of wire types.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{EndpointId, EndpointName, ProjectId, ProjectName};

/// URL recorded on every GitHub connection.
pub const GITHUB_ENDPOINT_URL: &str = "http://github.com";

/// Value of the `environment` data key on Azure Resource Manager connections.
pub const AZURE_CLOUD_ENVIRONMENT: &str = "AzureCloud";

/// Value of the `scopeLevel` data key on Azure Resource Manager connections.
pub const SUBSCRIPTION_SCOPE_LEVEL: &str = "Subscription";

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Caller-supplied credential used to authenticate against Azure DevOps.
///
/// Ownership stays with the caller; the value is handed to the remote client
/// unchanged. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// A personal access token, sent as HTTP basic auth with an empty user.
    PersonalAccessToken(String),
    /// An OAuth / Azure AD access token, sent as a bearer token.
    BearerToken(String),
}

impl Credentials {
    /// Returns the raw secret.
    pub fn secret(&self) -> &str {
        match self {
            Credentials::PersonalAccessToken(token) | Credentials::BearerToken(token) => token,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::PersonalAccessToken(_) => f.write_str("PersonalAccessToken(***)"),
            Credentials::BearerToken(_) => f.write_str("BearerToken(***)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Endpoint classification
// ---------------------------------------------------------------------------

/// The `type` of a service endpoint.
///
/// Only [`EndpointType::GitHub`] and [`EndpointType::AzureRm`] are ever
/// created here, but listing a project returns whatever types it holds, so
/// unknown values are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointType {
    /// `github`
    GitHub,
    /// `azurerm`
    AzureRm,
    /// Any other endpoint type reported by the remote service.
    Other(String),
}

impl EndpointType {
    /// Returns the wire representation of the type.
    pub fn as_str(&self) -> &str {
        match self {
            EndpointType::GitHub => "github",
            EndpointType::AzureRm => "azurerm",
            EndpointType::Other(other) => other,
        }
    }
}

impl From<String> for EndpointType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "github" => EndpointType::GitHub,
            "azurerm" => EndpointType::AzureRm,
            _ => EndpointType::Other(value),
        }
    }
}

impl From<EndpointType> for String {
    fn from(value: EndpointType) -> Self {
        match value {
            EndpointType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EndpointType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authorization scheme of an endpoint's credential record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorizationScheme {
    /// `PersonalAccessToken`
    PersonalAccessToken,
    /// `ServicePrincipal`
    ServicePrincipal,
    /// Any other scheme reported by the remote service.
    Other(String),
}

impl AuthorizationScheme {
    /// Returns the wire representation of the scheme.
    pub fn as_str(&self) -> &str {
        match self {
            AuthorizationScheme::PersonalAccessToken => "PersonalAccessToken",
            AuthorizationScheme::ServicePrincipal => "ServicePrincipal",
            AuthorizationScheme::Other(other) => other,
        }
    }
}

impl From<String> for AuthorizationScheme {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PersonalAccessToken" => AuthorizationScheme::PersonalAccessToken,
            "ServicePrincipal" => AuthorizationScheme::ServicePrincipal,
            _ => AuthorizationScheme::Other(value),
        }
    }
}

impl From<AuthorizationScheme> for String {
    fn from(value: AuthorizationScheme) -> Self {
        match value {
            AuthorizationScheme::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

/// Credential record attached to a service endpoint.
///
/// `Debug` lists parameter keys only; values are secrets.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointAuthorization {
    /// How `parameters` should be interpreted.
    pub scheme: AuthorizationScheme,

    /// Scheme-specific key/value pairs. The remote service blanks secret
    /// values in responses, either as `null` or by sending no map at all;
    /// blanked entries are dropped on decode.
    #[serde(default, deserialize_with = "string_map_without_nulls")]
    pub parameters: BTreeMap<String, String>,
}

impl EndpointAuthorization {
    /// A `PersonalAccessToken` record carrying `token` under `accessToken`.
    pub fn personal_access_token(token: impl Into<String>) -> Self {
        let mut parameters = BTreeMap::new();
        parameters.insert("accessToken".to_string(), token.into());
        Self {
            scheme: AuthorizationScheme::PersonalAccessToken,
            parameters,
        }
    }

    /// A `ServicePrincipal` record authenticating with the principal's key.
    pub fn service_principal(principal: &ServicePrincipal) -> Self {
        let parameters = BTreeMap::from([
            ("tenantid".to_string(), principal.tenant.clone()),
            ("serviceprincipalid".to_string(), principal.app_id.clone()),
            ("authenticationType".to_string(), "spnKey".to_string()),
            ("serviceprincipalkey".to_string(), principal.password.clone()),
        ]);
        Self {
            scheme: AuthorizationScheme::ServicePrincipal,
            parameters,
        }
    }
}

impl std::fmt::Debug for EndpointAuthorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointAuthorization")
            .field("scheme", &self.scheme)
            .field("parameters", &self.parameters.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Service endpoint
// ---------------------------------------------------------------------------

/// A project-scoped service endpoint (service connection).
///
/// The same type is used as the creation request (with `id` unset) and as
/// the representation returned by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEndpoint {
    /// Assigned by the remote service on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EndpointId>,

    /// Display name of the endpoint.
    pub name: EndpointName,

    /// Endpoint type (`github`, `azurerm`, ...).
    #[serde(rename = "type")]
    pub endpoint_type: EndpointType,

    /// URL of the external system, where the endpoint type has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Credential record. Absent in some list responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<EndpointAuthorization>,

    /// Free-form type-specific data. `null` values are dropped on decode.
    #[serde(default, deserialize_with = "string_map_without_nulls")]
    pub data: BTreeMap<String, String>,

    /// Whether the remote service has finished provisioning the endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_ready: Option<bool>,

    /// Owner reported by the remote service (e.g. `"Library"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl ServiceEndpoint {
    /// Builds a GitHub personal-access-token connection request.
    pub fn github(name: EndpointName, access_token: impl Into<String>) -> Self {
        Self {
            id: None,
            name,
            endpoint_type: EndpointType::GitHub,
            url: Some(GITHUB_ENDPOINT_URL.to_string()),
            description: None,
            authorization: Some(EndpointAuthorization::personal_access_token(access_token)),
            data: BTreeMap::new(),
            is_ready: None,
            owner: None,
        }
    }

    /// Builds an Azure Resource Manager service-principal connection request
    /// scoped to the subscription in `account`.
    ///
    /// Returns `None` if the principal's display name is empty.
    pub fn azure_rm(account: &AccountInfo, principal: &ServicePrincipal) -> Option<Self> {
        let name = EndpointName::new(principal.display_name.clone())?;
        let data = BTreeMap::from([
            ("subscriptionId".to_string(), account.id.clone()),
            ("subscriptionName".to_string(), account.name.clone()),
            ("environment".to_string(), AZURE_CLOUD_ENVIRONMENT.to_string()),
            ("scopeLevel".to_string(), SUBSCRIPTION_SCOPE_LEVEL.to_string()),
        ]);
        Some(Self {
            id: None,
            name,
            endpoint_type: EndpointType::AzureRm,
            url: None,
            description: None,
            authorization: Some(EndpointAuthorization::service_principal(principal)),
            data,
            is_ready: None,
            owner: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// A team project resolved from its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectReference {
    /// Project GUID.
    pub id: ProjectId,
    /// Project name as stored by the remote service.
    pub name: ProjectName,
}

// ---------------------------------------------------------------------------
// Cloud identity
// ---------------------------------------------------------------------------

/// The cloud subscription the local tooling is currently signed in to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Subscription id.
    pub id: String,
    /// Subscription display name.
    pub name: String,
}

/// A newly created service principal and its secret.
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    /// Directory (tenant) id.
    pub tenant: String,
    /// Application (client) id.
    pub app_id: String,
    /// Client secret.
    pub password: String,
    /// Display name chosen by the directory for the principal.
    pub display_name: String,
}

impl std::fmt::Debug for ServicePrincipal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePrincipal")
            .field("tenant", &self.tenant)
            .field("app_id", &self.app_id)
            .field("password", &"***")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// Decodes a string map that may itself be `null` or hold `null` values.
fn string_map_without_nulls<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = Option::<BTreeMap<String, Option<String>>>::deserialize(deserializer)?;
    Ok(map
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect())
}
