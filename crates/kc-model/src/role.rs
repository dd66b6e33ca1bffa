//! Role domain model.
//!
//! A role is either realm-scoped (`client_id` is `None`) or
//! client-scoped. The triple `(realm_id, client_id, name)` is unique.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A role record kept in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    // === Identity ===
    /// External identifier, generated once and never changed.
    ///
    /// An empty identifier marks a record that has not been persisted
    /// yet; the repository assigns one on first insert.
    pub id: String,
    /// Role name (unique within realm or client).
    pub name: String,
    /// Role description.
    pub description: Option<String>,

    // === Scope ===
    /// Realm this role belongs to.
    pub realm_id: String,
    /// Client this role belongs to (None for realm roles).
    pub client_id: Option<String>,

    // === Timestamps ===
    /// When the role was created.
    pub created_at: DateTime<Utc>,
    /// When the role was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a new realm role with a fresh identifier.
    #[must_use]
    pub fn new_realm_role(realm_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(realm_id.into(), None, name.into())
    }

    /// Creates a new client role with a fresh identifier.
    #[must_use]
    pub fn new_client_role(
        realm_id: impl Into<String>,
        client_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(realm_id.into(), Some(client_id.into()), name.into())
    }

    fn new(realm_id: String, client_id: Option<String>, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name,
            description: None,
            realm_id,
            client_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Checks if this is a realm role.
    #[must_use]
    pub const fn is_realm_role(&self) -> bool {
        self.client_id.is_none()
    }

    /// Checks if this is a client role.
    #[must_use]
    pub const fn is_client_role(&self) -> bool {
        self.client_id.is_some()
    }

    /// Returns whether the record has been assigned an identifier.
    #[must_use]
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Returns the id of the container: the client for client roles,
    /// the realm otherwise.
    #[must_use]
    pub fn container_id(&self) -> &str {
        self.client_id.as_deref().unwrap_or(&self.realm_id)
    }

    /// Returns whether this role has the given scope.
    #[must_use]
    pub fn matches_scope(&self, realm_id: &str, client_id: Option<&str>) -> bool {
        self.realm_id == realm_id && self.client_id.as_deref() == client_id
    }

    /// Advances `updated_at`, never moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}

/// Generates a new external role identifier.
///
/// Version 7 UUIDs sort by creation time, which gives listings ordered
/// by identifier a stable creation order.
#[must_use]
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}
