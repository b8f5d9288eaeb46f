//! Derived endpoint names.
//!
//! Endpoints created for a repository are named
//! `http://{domain}/{organization}/{project}/{repository}/{service}`, and
//! lookups recompute the same string. The `http://` prefix is required
//! because the name doubles as the service principal name, which Azure AD
//! only accepts in URI form.

use serde::{Deserialize, Serialize};

use crate::{EndpointName, OrganizationName, ProjectName, RepositoryName};

/// Domain segment used when none is configured.
pub const DEFAULT_ENDPOINT_DOMAIN: &str = "azure-functions-devops-build.com";

/// Service segment used for build/release pipeline connections.
pub const PIPELINE_SERVICE: &str = "pipeline";

/// The naming convention shared by the create and lookup paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    domain: String,
}

impl NamingConvention {
    /// Creates a convention with a custom domain segment.
    ///
    /// Returns `None` if `domain` is empty.
    pub fn new(domain: impl Into<String>) -> Option<Self> {
        let domain = domain.into();
        if domain.is_empty() {
            None
        } else {
            Some(Self { domain })
        }
    }

    /// Returns the domain segment.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Computes the endpoint name for `service` on `repository`.
    pub fn endpoint_name(
        &self,
        organization: &OrganizationName,
        project: &ProjectName,
        repository: &RepositoryName,
        service: &str,
    ) -> EndpointName {
        let name = format!(
            "http://{domain}/{organization}/{project}/{repository}/{service}",
            domain = self.domain,
        );
        // The scheme prefix keeps the result non-empty.
        EndpointName::new(name).unwrap_or_else(|| unreachable!("derived names are never empty"))
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            domain: DEFAULT_ENDPOINT_DOMAIN.to_string(),
        }
    }
}
