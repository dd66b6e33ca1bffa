//! Namespaced role identifiers.
//!
//! The host sees every externally stored role under a single opaque id
//! of the form `f:{componentId}:{externalId}`. The component id tells
//! the host which provider instance owns the role; the external id is
//! the primary key in the role store.

use std::fmt;

use crate::error::{FederationError, FederationResult};

const PREFIX: &str = "f:";

/// A decoded federated role identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageId {
    component_id: String,
    external_id: String,
}

impl StorageId {
    /// Creates an identifier from its parts.
    #[must_use]
    pub fn new(component_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            external_id: external_id.into(),
        }
    }

    /// Decodes an opaque identifier.
    ///
    /// # Errors
    ///
    /// Returns `FederationError::MalformedIdentity` if the string lacks
    /// the `f:` prefix or either part is empty.
    pub fn decode(id: &str) -> FederationResult<Self> {
        let rest = id
            .strip_prefix(PREFIX)
            .ok_or_else(|| FederationError::malformed_identity(id))?;
        let (component_id, external_id) = rest
            .split_once(':')
            .ok_or_else(|| FederationError::malformed_identity(id))?;
        if component_id.is_empty() || external_id.is_empty() {
            return Err(FederationError::malformed_identity(id));
        }
        Ok(Self::new(component_id, external_id))
    }

    /// Returns the opaque string form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Returns the owning component id.
    #[must_use]
    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    /// Returns the role store primary key.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Returns whether this identifier belongs to the given component.
    #[must_use]
    pub fn belongs_to(&self, component_id: &str) -> bool {
        self.component_id == component_id
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}:{}", self.component_id, self.external_id)
    }
}

/// Encodes a component id and external id into an opaque identifier.
#[must_use]
pub fn encode(component_id: &str, external_id: &str) -> String {
    StorageId::new(component_id, external_id).encode()
}

/// Decodes `id` and returns its external id if it belongs to `component_id`.
///
/// Malformed identifiers and identifiers owned by other components both
/// yield `None`.
#[must_use]
pub fn external_id_for(id: &str, component_id: &str) -> Option<String> {
    let storage_id = StorageId::decode(id).ok()?;
    storage_id
        .belongs_to(component_id)
        .then(|| storage_id.external_id)
}
