//! Azure DevOps REST infrastructure adapter.
//!
//! Implements the [`endpoints::ServiceEndpointClient`] trait against the
//! Azure DevOps REST API using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules.
//! URL layout, authentication headers, status-code classification and the
//! list-response envelope are handled here; the [`endpoints`] crate never
//! sees them.
//!
//! ## Endpoints used
//!
//! | Trait method | Request |
//! |--------------|---------|
//! | `get_project_by_name` | `GET {org}/_apis/projects/{project}` |
//! | `get_service_endpoints_by_names` | `GET {org}/{project}/_apis/serviceendpoint/endpoints?endpointNames=...` |
//! | `create_service_endpoint` | `POST {org}/{projectId}/_apis/serviceendpoint/endpoints` |
//! | `get_service_endpoints` | `GET {org}/{projectId}/_apis/serviceendpoint/endpoints` |
//!
//! Nothing is retried and only the first page of a list is read.

mod client;
mod config;
mod errors;

pub use client::DevOpsClient;
pub use config::{DevOpsConfig, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use errors::DevOpsError;
