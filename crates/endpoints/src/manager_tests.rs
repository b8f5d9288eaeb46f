use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::*;
use crate::{
    AccountInfo, AuthorizationScheme, EndpointId, EndpointType, ProjectId, ProjectReference,
    RemoteError, RemoteErrorKind, ServicePrincipal,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Call {
    GetProject(ProjectName),
    GetByNames(ProjectName, Vec<EndpointName>),
    Create(ServiceEndpoint, ProjectId),
    List(ProjectId),
}

#[derive(Default)]
struct FakeClient {
    project: Option<ProjectReference>,
    endpoints: Vec<ServiceEndpoint>,
    reject_create: Option<RemoteError>,
    calls: Mutex<Vec<Call>>,
}

impl FakeClient {
    fn with_project(project: &ProjectReference) -> Self {
        Self {
            project: Some(project.clone()),
            ..Self::default()
        }
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn created(&self) -> Vec<ServiceEndpoint> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(endpoint, _) => Some(endpoint),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ServiceEndpointClient for FakeClient {
    async fn get_project_by_name(
        &self,
        project: &ProjectName,
    ) -> Result<ProjectReference, ServiceEndpointError> {
        self.record(Call::GetProject(project.clone()));
        self.project
            .clone()
            .ok_or_else(|| ServiceEndpointError::ProjectNotFound {
                project: project.clone(),
            })
    }

    async fn get_service_endpoints_by_names(
        &self,
        project: &ProjectName,
        names: &[EndpointName],
    ) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError> {
        self.record(Call::GetByNames(project.clone(), names.to_vec()));
        Ok(self
            .endpoints
            .iter()
            .filter(|e| names.contains(&e.name))
            .cloned()
            .collect())
    }

    async fn create_service_endpoint(
        &self,
        endpoint: &ServiceEndpoint,
        project: ProjectId,
    ) -> Result<ServiceEndpoint, ServiceEndpointError> {
        self.record(Call::Create(endpoint.clone(), project));
        if let Some(err) = &self.reject_create {
            return Err(err.clone().into());
        }
        let mut stored = endpoint.clone();
        stored.id = Some(EndpointId::from_uuid(Uuid::new_v4()));
        stored.is_ready = Some(true);
        Ok(stored)
    }

    async fn get_service_endpoints(
        &self,
        project: ProjectId,
    ) -> Result<Vec<ServiceEndpoint>, ServiceEndpointError> {
        self.record(Call::List(project));
        Ok(self.endpoints.clone())
    }
}

#[derive(Default)]
struct FakeIdentity {
    account: Option<AccountInfo>,
    principal: Option<ServicePrincipal>,
    principal_requests: Mutex<Vec<EndpointName>>,
}

impl FakeIdentity {
    fn signed_in() -> Self {
        Self {
            account: Some(AccountInfo {
                id: "sub1".to_string(),
                name: "Subscription One".to_string(),
            }),
            principal: Some(ServicePrincipal {
                tenant: "t1".to_string(),
                app_id: "a1".to_string(),
                password: "p1".to_string(),
                display_name: "repoA-pipeline".to_string(),
            }),
            principal_requests: Mutex::new(Vec::new()),
        }
    }

    fn principal_requests(&self) -> Vec<EndpointName> {
        self.principal_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_account(&self) -> Result<AccountInfo, ServiceEndpointError> {
        self.account
            .clone()
            .ok_or_else(|| ServiceEndpointError::MalformedIdentityOutput {
                command: "az account show --output json".to_string(),
                message: "expected value at line 1 column 1".to_string(),
            })
    }

    async fn create_service_principal(
        &self,
        name: &EndpointName,
    ) -> Result<ServicePrincipal, ServiceEndpointError> {
        self.principal_requests.lock().unwrap().push(name.clone());
        self.principal
            .clone()
            .ok_or_else(|| ServiceEndpointError::MalformedIdentityOutput {
                command: format!("az ad sp create-for-rbac --output json --name {name}"),
                message: "missing field `appId`".to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn project_ref() -> ProjectReference {
    ProjectReference {
        id: ProjectId::from_uuid(Uuid::parse_str("6ce954b1-ce1f-45d1-b94d-e6bf2464ba2c").unwrap()),
        name: ProjectName::new("proj1").unwrap(),
    }
}

fn manager(client: FakeClient, identity: FakeIdentity) -> ServiceEndpointManager<FakeClient, FakeIdentity> {
    ServiceEndpointManager::new(
        OrganizationName::new("contoso").unwrap(),
        ProjectName::new("proj1").unwrap(),
        client,
        identity,
    )
    .with_naming(NamingConvention::new("example.test").unwrap())
}

fn repo(name: &str) -> RepositoryName {
    RepositoryName::new(name).unwrap()
}

fn endpoint_named(name: &str, endpoint_type: EndpointType) -> ServiceEndpoint {
    let mut endpoint = ServiceEndpoint::github(EndpointName::new(name).unwrap(), "");
    endpoint.endpoint_type = endpoint_type;
    endpoint.authorization = None;
    endpoint
}

// ---------------------------------------------------------------------------
// lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lookup_queries_exactly_the_derived_name() {
    let manager = manager(FakeClient::with_project(&project_ref()), FakeIdentity::default());

    let result = manager.lookup(&repo("repoA")).await.unwrap();

    assert!(result.is_none());
    assert_eq!(
        manager.client().calls(),
        vec![Call::GetByNames(
            ProjectName::new("proj1").unwrap(),
            vec![EndpointName::new("http://example.test/contoso/proj1/repoA/pipeline").unwrap()],
        )]
    );
}

#[tokio::test]
async fn lookup_returns_the_matching_endpoint() {
    let derived = "http://example.test/contoso/proj1/repoA/pipeline";
    let client = FakeClient {
        endpoints: vec![
            endpoint_named("unrelated", EndpointType::GitHub),
            endpoint_named(derived, EndpointType::AzureRm),
        ],
        ..FakeClient::with_project(&project_ref())
    };
    let manager = manager(client, FakeIdentity::default());

    let found = manager.lookup(&repo("repoA")).await.unwrap().unwrap();

    assert_eq!(found.name.as_str(), derived);
    assert_eq!(found.endpoint_type, EndpointType::AzureRm);
}

#[tokio::test]
async fn lookup_with_several_matches_returns_the_first() {
    let derived = "http://example.test/contoso/proj1/repoA/pipeline";
    let client = FakeClient {
        endpoints: vec![
            endpoint_named(derived, EndpointType::AzureRm),
            endpoint_named(derived, EndpointType::GitHub),
        ],
        ..FakeClient::with_project(&project_ref())
    };
    let manager = manager(client, FakeIdentity::default());

    let found = manager.lookup(&repo("repoA")).await.unwrap().unwrap();

    assert_eq!(found.name.as_str(), derived);
    assert_eq!(found.endpoint_type, EndpointType::AzureRm);
}

#[tokio::test]
async fn lookup_with_no_match_is_not_an_error() {
    let client = FakeClient {
        endpoints: vec![endpoint_named("unrelated", EndpointType::GitHub)],
        ..FakeClient::with_project(&project_ref())
    };
    let manager = manager(client, FakeIdentity::default());

    assert!(manager.lookup(&repo("repoB")).await.unwrap().is_none());
}

#[tokio::test]
async fn derived_name_is_shared_by_create_and_lookup() {
    let manager = manager(FakeClient::with_project(&project_ref()), FakeIdentity::signed_in());

    manager
        .create_azure_service_principal_connection(&repo("repoA"))
        .await
        .unwrap();
    manager.lookup(&repo("repoA")).await.unwrap();

    let principal_name = manager.identity().principal_requests().remove(0);
    let looked_up = manager
        .client()
        .calls()
        .into_iter()
        .find_map(|c| match c {
            Call::GetByNames(_, names) => Some(names),
            _ => None,
        })
        .unwrap();
    assert_eq!(looked_up, vec![principal_name]);
}

// ---------------------------------------------------------------------------
// create_github_connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn github_connection_is_created_in_the_resolved_project() {
    let project = project_ref();
    let manager = manager(FakeClient::with_project(&project), FakeIdentity::default());
    let name = EndpointName::new("my-github").unwrap();

    let created = manager
        .create_github_connection(&name, "ghp_token")
        .await
        .unwrap();

    assert!(created.id.is_some());
    let calls = manager.client().calls();
    assert_eq!(calls[0], Call::GetProject(ProjectName::new("proj1").unwrap()));
    match &calls[1] {
        Call::Create(request, project_id) => {
            assert_eq!(*project_id, project.id);
            assert_eq!(request.name, name);
            assert_eq!(request.endpoint_type, EndpointType::GitHub);
            let auth = request.authorization.as_ref().unwrap();
            assert_eq!(auth.scheme, AuthorizationScheme::PersonalAccessToken);
            assert_eq!(auth.parameters.len(), 1);
            assert_eq!(auth.parameters["accessToken"], "ghp_token");
        }
        other => panic!("expected a create call, got {other:?}"),
    }
}

#[tokio::test]
async fn github_connection_fails_when_project_is_missing() {
    let manager = manager(FakeClient::default(), FakeIdentity::default());

    let err = manager
        .create_github_connection(&EndpointName::new("gh").unwrap(), "tok")
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceEndpointError::ProjectNotFound { .. }));
    assert!(manager.client().created().is_empty());
}

#[tokio::test]
async fn github_connection_surfaces_remote_rejection_unmodified() {
    let rejection = RemoteError::new(
        RemoteErrorKind::Conflict,
        Some(409),
        "Service endpoint with name my-github already exists.",
    );
    let client = FakeClient {
        reject_create: Some(rejection.clone()),
        ..FakeClient::with_project(&project_ref())
    };
    let manager = manager(client, FakeIdentity::default());

    let err = manager
        .create_github_connection(&EndpointName::new("my-github").unwrap(), "tok")
        .await
        .unwrap_err();

    match err {
        ServiceEndpointError::Remote(remote) => assert_eq!(remote, rejection),
        other => panic!("expected a remote error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// create_azure_service_principal_connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn azure_connection_is_built_from_account_and_principal() {
    let project = project_ref();
    let manager = manager(FakeClient::with_project(&project), FakeIdentity::signed_in());

    let created = manager
        .create_azure_service_principal_connection(&repo("repoA"))
        .await
        .unwrap();

    assert_eq!(created.name.as_str(), "repoA-pipeline");
    assert_eq!(
        manager.identity().principal_requests(),
        vec![EndpointName::new("http://example.test/contoso/proj1/repoA/pipeline").unwrap()]
    );

    let submitted = manager.client().created();
    assert_eq!(submitted.len(), 1);
    let request = &submitted[0];
    assert_eq!(request.endpoint_type, EndpointType::AzureRm);
    assert_eq!(request.name.as_str(), "repoA-pipeline");
    assert_eq!(
        request.data,
        std::collections::BTreeMap::from([
            ("subscriptionId".to_string(), "sub1".to_string()),
            ("subscriptionName".to_string(), "Subscription One".to_string()),
            ("environment".to_string(), "AzureCloud".to_string()),
            ("scopeLevel".to_string(), "Subscription".to_string()),
        ])
    );
    let auth = request.authorization.as_ref().unwrap();
    assert_eq!(auth.scheme, AuthorizationScheme::ServicePrincipal);
    assert_eq!(auth.parameters["serviceprincipalkey"], "p1");
}

#[tokio::test]
async fn azure_connection_is_not_submitted_when_account_output_is_bad() {
    let identity = FakeIdentity {
        account: None,
        ..FakeIdentity::signed_in()
    };
    let manager = manager(FakeClient::with_project(&project_ref()), identity);

    let err = manager
        .create_azure_service_principal_connection(&repo("repoA"))
        .await
        .unwrap_err();

    assert!(err.is_external_process());
    assert!(manager.identity().principal_requests().is_empty());
    assert!(manager.client().created().is_empty());
}

#[tokio::test]
async fn azure_connection_is_not_submitted_when_principal_output_is_bad() {
    let identity = FakeIdentity {
        principal: None,
        ..FakeIdentity::signed_in()
    };
    let manager = manager(FakeClient::with_project(&project_ref()), identity);

    let err = manager
        .create_azure_service_principal_connection(&repo("repoA"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceEndpointError::MalformedIdentityOutput { .. }));
    assert!(manager.client().created().is_empty());
}

#[tokio::test]
async fn azure_connection_rejects_an_empty_display_name() {
    let mut identity = FakeIdentity::signed_in();
    if let Some(principal) = identity.principal.as_mut() {
        principal.display_name.clear();
    }
    let manager = manager(FakeClient::with_project(&project_ref()), identity);

    let err = manager
        .create_azure_service_principal_connection(&repo("repoA"))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceEndpointError::MalformedIdentityOutput { .. }));
    assert!(manager.client().created().is_empty());
}

// ---------------------------------------------------------------------------
// list_connections
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_exactly_what_the_service_reports() {
    let project = project_ref();
    let reported = vec![
        endpoint_named("b", EndpointType::AzureRm),
        endpoint_named("a", EndpointType::GitHub),
        endpoint_named("c", EndpointType::Other("kubernetes".to_string())),
    ];
    let client = FakeClient {
        endpoints: reported.clone(),
        ..FakeClient::with_project(&project)
    };
    let manager = manager(client, FakeIdentity::default());

    let listed = manager.list_connections().await.unwrap();

    assert_eq!(listed, reported);
    assert_eq!(
        manager.client().calls(),
        vec![
            Call::GetProject(ProjectName::new("proj1").unwrap()),
            Call::List(project.id),
        ]
    );
}

#[tokio::test]
async fn list_fails_when_project_is_missing() {
    let manager = manager(FakeClient::default(), FakeIdentity::default());

    let err = manager.list_connections().await.unwrap_err();

    assert!(matches!(err, ServiceEndpointError::ProjectNotFound { .. }));
}
