//! Host-facing projection of a stored role.
//!
//! Externally stored roles are flat: they have no composites and no
//! attributes. Reads of either return nothing; writes fail with
//! [`FederationError::Unsupported`] rather than being dropped.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kc_model::{Client, Realm, Role};
use kc_storage::RoleRepository;

use crate::error::{FederationError, FederationResult};
use crate::host::HostModel;
use crate::storage_id;

const COMPOSITES_UNSUPPORTED: &str = "composite roles are not supported by external role storage";
const ATTRIBUTES_UNSUPPORTED: &str = "role attributes are not supported by external role storage";

/// The container a role belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleContainer {
    /// Realm role.
    Realm(Realm),
    /// Client role.
    Client(Client),
}

impl RoleContainer {
    /// Returns the container's identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Realm(realm) => &realm.id,
            Self::Client(client) => &client.id,
        }
    }
}

/// A stored role as seen by the host.
///
/// Two projections are equal when they wrap the same stored record.
#[derive(Clone)]
pub struct FederatedRole {
    record: Role,
    component_id: Arc<str>,
    repository: Arc<dyn RoleRepository>,
    host: Arc<dyn HostModel>,
}

impl FederatedRole {
    /// Wraps a stored record.
    #[must_use]
    pub fn new(
        record: Role,
        component_id: Arc<str>,
        repository: Arc<dyn RoleRepository>,
        host: Arc<dyn HostModel>,
    ) -> Self {
        Self {
            record,
            component_id,
            repository,
            host,
        }
    }

    /// Returns the namespaced identifier handed to the host.
    #[must_use]
    pub fn id(&self) -> String {
        storage_id::encode(&self.component_id, &self.record.id)
    }

    /// Returns the role store primary key.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.record.id
    }

    /// Returns the underlying record.
    #[must_use]
    pub const fn record(&self) -> &Role {
        &self.record
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    /// Renames the role and persists the change.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails, including a duplicate
    /// error when the new name is taken in the same scope. The projection
    /// keeps its previous state on failure.
    pub async fn set_name(&mut self, name: impl Into<String>) -> FederationResult<()> {
        let name = name.into();
        tracing::info!(
            role_id = %self.record.id,
            from = %self.record.name,
            to = %name,
            "Renaming role"
        );
        let mut updated = self.record.clone();
        updated.name = name;
        self.persist(updated).await
    }

    /// Returns the role description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.record.description.as_deref()
    }

    /// Changes the description and persists the change.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub async fn set_description(&mut self, description: Option<String>) -> FederationResult<()> {
        tracing::info!(role_id = %self.record.id, role = %self.record.name, "Updating role description");
        let mut updated = self.record.clone();
        updated.description = description;
        self.persist(updated).await
    }

    async fn persist(&mut self, updated: Role) -> FederationResult<()> {
        self.record = self.repository.save(updated).await?;
        Ok(())
    }

    /// Checks if this is a client role.
    #[must_use]
    pub const fn is_client_role(&self) -> bool {
        self.record.is_client_role()
    }

    /// Returns the client id for client roles, the realm id otherwise.
    #[must_use]
    pub fn container_id(&self) -> &str {
        self.record.container_id()
    }

    /// Resolves the container through the host model.
    ///
    /// Returns `Ok(None)` when the realm or the owning client no longer
    /// exists; the projection itself stays usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the host lookup fails.
    pub async fn container(&self) -> FederationResult<Option<RoleContainer>> {
        let realm_id = &self.record.realm_id;
        let container = match &self.record.client_id {
            Some(client_id) => self
                .host
                .client_by_id(realm_id, client_id)
                .await?
                .map(RoleContainer::Client),
            None => self.host.realm(realm_id).await?.map(RoleContainer::Realm),
        };

        if container.is_none() {
            tracing::warn!(
                role_id = %self.record.id,
                container_id = %self.container_id(),
                "Role container not found"
            );
        }
        Ok(container)
    }

    /// Stored roles are never composite.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        false
    }

    /// Always fails: composites are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `FederationError::Unsupported`.
    pub fn add_composite_role(&self, _role: &Self) -> FederationResult<()> {
        Err(FederationError::unsupported(COMPOSITES_UNSUPPORTED))
    }

    /// Always fails: composites are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `FederationError::Unsupported`.
    pub fn remove_composite_role(&self, _role: &Self) -> FederationResult<()> {
        Err(FederationError::unsupported(COMPOSITES_UNSUPPORTED))
    }

    /// Lists composite roles. Always empty.
    #[must_use]
    pub fn composites(&self, _search: Option<&str>, _first: Option<i32>, _max: Option<i32>) -> Vec<Self> {
        Vec::new()
    }

    /// Returns whether this role is, or contains, `role`.
    ///
    /// Without composites this is plain identity.
    #[must_use]
    pub fn has_role(&self, role: &Self) -> bool {
        self == role
    }

    /// Always fails: attributes are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `FederationError::Unsupported`.
    pub fn set_single_attribute(&self, _name: &str, _value: &str) -> FederationResult<()> {
        Err(FederationError::unsupported(ATTRIBUTES_UNSUPPORTED))
    }

    /// Always fails: attributes are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `FederationError::Unsupported`.
    pub fn set_attribute(&self, _name: &str, _values: &[String]) -> FederationResult<()> {
        Err(FederationError::unsupported(ATTRIBUTES_UNSUPPORTED))
    }

    /// Always fails: attributes are not supported.
    ///
    /// # Errors
    ///
    /// Always returns `FederationError::Unsupported`.
    pub fn remove_attribute(&self, _name: &str) -> FederationResult<()> {
        Err(FederationError::unsupported(ATTRIBUTES_UNSUPPORTED))
    }

    /// Gets the values of an attribute. Always empty.
    #[must_use]
    pub fn attribute(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }

    /// Gets all attributes. Always empty.
    #[must_use]
    pub fn attributes(&self) -> HashMap<String, Vec<String>> {
        HashMap::new()
    }
}

impl PartialEq for FederatedRole {
    fn eq(&self, other: &Self) -> bool {
        self.record.id == other.record.id
    }
}

impl Eq for FederatedRole {}

impl Hash for FederatedRole {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.record.id.hash(state);
    }
}

impl fmt::Debug for FederatedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederatedRole")
            .field("id", &self.id())
            .field("name", &self.record.name)
            .field("realm_id", &self.record.realm_id)
            .field("client_id", &self.record.client_id)
            .finish_non_exhaustive()
    }
}
