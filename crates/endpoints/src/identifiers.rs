//! Newtype domain identifiers.
//!
//! Every name or id that crosses the manager boundary is a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging, for
//! example, a [`ProjectName`] with a [`RepositoryName`] even though both are
//! `String` under the hood, or querying by [`ProjectName`] where the remote
//! API wants a [`ProjectId`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for GUID-wrapped newtypes (ids assigned by Azure DevOps).
// Generates: struct (Copy), from_uuid(), as_uuid(), Display.
// ---------------------------------------------------------------------------
macro_rules! uuid_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates an identifier from an existing UUID (e.g. deserialised from a response).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the underlying [`Uuid`].
            pub fn as_uuid(self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GUID-backed (assigned by the remote service)
// ---------------------------------------------------------------------------

uuid_id! {
    /// Identifies an Azure DevOps team project.
    ///
    /// Endpoint creation and listing are addressed by project id; lookup by
    /// name is addressed by [`ProjectName`].
    ProjectId
}

uuid_id! {
    /// Identifies a service endpoint once the remote service has created it.
    EndpointId
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed (names supplied by the caller)
// ---------------------------------------------------------------------------

string_id! {
    /// An Azure DevOps organization name (the first path segment after
    /// `dev.azure.com`).
    OrganizationName
}

string_id! {
    /// An Azure DevOps team project name within an organization.
    ProjectName
}

string_id! {
    /// A source repository name. Only used as a segment of the derived
    /// endpoint name; the repository itself is never contacted.
    RepositoryName
}

string_id! {
    /// The display name of a service endpoint.
    ///
    /// Endpoints created for a repository carry a derived name (see
    /// [`crate::naming`]); GitHub connections carry a caller-chosen name.
    EndpointName
}
