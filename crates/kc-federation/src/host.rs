//! The host identity provider's live model.
//!
//! The synchronizer and the role projection never read realms, clients,
//! or the host's own roles directly. They go through [`HostModel`], which
//! the embedding server implements over its session.

use std::collections::HashMap;

use async_trait::async_trait;
use kc_model::{Client, Realm};
use parking_lot::RwLock;

use crate::error::FederationResult;

/// A role as defined in the host model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRole {
    /// Host role identifier.
    pub id: String,
    /// Role name.
    pub name: String,
    /// Role description.
    pub description: Option<String>,
    /// Owning client's internal id (None for realm roles).
    pub client_id: Option<String>,
}

impl HostRole {
    /// Creates a realm role.
    #[must_use]
    pub fn realm(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            client_id: None,
        }
    }

    /// Creates a client role.
    #[must_use]
    pub fn client(
        id: impl Into<String>,
        client_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            client_id: Some(client_id.into()),
            ..Self::realm(id, name)
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Checks if this is a client role.
    #[must_use]
    pub const fn is_client_role(&self) -> bool {
        self.client_id.is_some()
    }
}

/// Read access to the host's realms, clients, and roles.
#[async_trait]
pub trait HostModel: Send + Sync {
    /// Gets a realm by ID.
    async fn realm(&self, realm_id: &str) -> FederationResult<Option<Realm>>;

    /// Gets a client by its internal ID.
    async fn client_by_id(&self, realm_id: &str, id: &str) -> FederationResult<Option<Client>>;

    /// Lists all clients of a realm.
    async fn clients(&self, realm_id: &str) -> FederationResult<Vec<Client>>;

    /// Gets a realm role by name.
    async fn realm_role(&self, realm_id: &str, name: &str) -> FederationResult<Option<HostRole>>;

    /// Gets a client role by name.
    async fn client_role(
        &self,
        realm_id: &str,
        client_id: &str,
        name: &str,
    ) -> FederationResult<Option<HostRole>>;
}

#[derive(Debug, Default)]
struct HostState {
    realms: HashMap<String, Realm>,
    clients: Vec<Client>,
    roles: HashMap<String, Vec<HostRole>>,
}

/// In-memory host model for embedded use and tests.
#[derive(Debug, Default)]
pub struct InMemoryHostModel {
    state: RwLock<HostState>,
}

impl InMemoryHostModel {
    /// Creates an empty host model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a realm.
    pub fn add_realm(&self, realm: Realm) {
        self.state.write().realms.insert(realm.id.clone(), realm);
    }

    /// Adds a client.
    pub fn add_client(&self, client: Client) {
        let mut state = self.state.write();
        state.clients.retain(|c| c.id != client.id);
        state.clients.push(client);
    }

    /// Removes a client. Roles it owned stay behind.
    pub fn remove_client(&self, id: &str) {
        self.state.write().clients.retain(|c| c.id != id);
    }

    /// Adds or replaces a role (matched by name and scope).
    pub fn add_role(&self, realm_id: &str, role: HostRole) {
        let mut state = self.state.write();
        let roles = state.roles.entry(realm_id.to_string()).or_default();
        roles.retain(|r| !(r.name == role.name && r.client_id == role.client_id));
        roles.push(role);
    }

    /// Removes a role by name and scope.
    pub fn remove_role(&self, realm_id: &str, client_id: Option<&str>, name: &str) {
        if let Some(roles) = self.state.write().roles.get_mut(realm_id) {
            roles.retain(|r| !(r.name == name && r.client_id.as_deref() == client_id));
        }
    }

    fn find_role(&self, realm_id: &str, client_id: Option<&str>, name: &str) -> Option<HostRole> {
        self.state
            .read()
            .roles
            .get(realm_id)?
            .iter()
            .find(|r| r.name == name && r.client_id.as_deref() == client_id)
            .cloned()
    }
}

#[async_trait]
impl HostModel for InMemoryHostModel {
    async fn realm(&self, realm_id: &str) -> FederationResult<Option<Realm>> {
        Ok(self.state.read().realms.get(realm_id).cloned())
    }

    async fn client_by_id(&self, realm_id: &str, id: &str) -> FederationResult<Option<Client>> {
        Ok(self
            .state
            .read()
            .clients
            .iter()
            .find(|c| c.realm_id == realm_id && c.id == id)
            .cloned())
    }

    async fn clients(&self, realm_id: &str) -> FederationResult<Vec<Client>> {
        Ok(self
            .state
            .read()
            .clients
            .iter()
            .filter(|c| c.realm_id == realm_id)
            .cloned()
            .collect())
    }

    async fn realm_role(&self, realm_id: &str, name: &str) -> FederationResult<Option<HostRole>> {
        Ok(self.find_role(realm_id, None, name))
    }

    async fn client_role(
        &self,
        realm_id: &str,
        client_id: &str,
        name: &str,
    ) -> FederationResult<Option<HostRole>> {
        Ok(self.find_role(realm_id, Some(client_id), name))
    }
}
