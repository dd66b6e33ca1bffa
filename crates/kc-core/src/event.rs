//! Administrative lifecycle events.
//!
//! The host emits one [`AdminEvent`] for every create/update/delete
//! performed through its management interface. An event carries only
//! the operation, the kind of resource touched, a resource path such as
//! `roles/billing-admin` or `clients/{client-uuid}/roles/viewer`, and
//! the realm identifier. Everything else must be looked up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operation performed by an administrative action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    /// Resource created.
    Create,
    /// Resource updated.
    Update,
    /// Resource deleted.
    Delete,
    /// Non-CRUD action (e.g. sending a verification email).
    Action,
}

/// Kind of resource an administrative event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// A realm.
    Realm,
    /// A realm-scoped role.
    RealmRole,
    /// A client-scoped role.
    ClientRole,
    /// A realm role mapping on a user or group.
    RealmRoleMapping,
    /// A client role mapping on a user or group.
    ClientRoleMapping,
    /// A user.
    User,
    /// A group.
    Group,
    /// A client.
    Client,
    /// A client scope.
    ClientScope,
    /// An identity provider.
    IdentityProvider,
    /// A component (e.g. a storage provider instance).
    Component,
}

impl ResourceType {
    /// Returns whether the resource is a role definition.
    #[must_use]
    pub const fn is_role(&self) -> bool {
        matches!(self, Self::RealmRole | Self::ClientRole)
    }
}

/// An administrative lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// When the event occurred.
    pub time: DateTime<Utc>,
    /// Realm the resource lives in.
    pub realm_id: String,
    /// Operation performed.
    pub operation_type: OperationType,
    /// Kind of resource.
    pub resource_type: ResourceType,
    /// Path of the resource relative to the realm admin endpoint.
    pub resource_path: String,
    /// Serialized representation, when the host includes it.
    pub representation: Option<String>,
}

impl AdminEvent {
    /// Creates a new event builder.
    #[must_use]
    pub fn builder(operation_type: OperationType, resource_type: ResourceType) -> AdminEventBuilder {
        AdminEventBuilder::new(operation_type, resource_type)
    }
}

/// Builder for [`AdminEvent`].
#[derive(Debug, Clone)]
pub struct AdminEventBuilder {
    operation_type: OperationType,
    resource_type: ResourceType,
    realm_id: String,
    resource_path: String,
    representation: Option<String>,
}

impl AdminEventBuilder {
    /// Creates a new builder.
    #[must_use]
    pub const fn new(operation_type: OperationType, resource_type: ResourceType) -> Self {
        Self {
            operation_type,
            resource_type,
            realm_id: String::new(),
            resource_path: String::new(),
            representation: None,
        }
    }

    /// Sets the realm ID.
    #[must_use]
    pub fn realm(mut self, realm_id: impl Into<String>) -> Self {
        self.realm_id = realm_id.into();
        self
    }

    /// Sets the resource path.
    #[must_use]
    pub fn resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = path.into();
        self
    }

    /// Sets the serialized representation.
    #[must_use]
    pub fn representation(mut self, representation: impl Into<String>) -> Self {
        self.representation = Some(representation.into());
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> AdminEvent {
        AdminEvent {
            id: Uuid::now_v7(),
            time: Utc::now(),
            realm_id: self.realm_id,
            operation_type: self.operation_type,
            resource_type: self.resource_type,
            resource_path: self.resource_path,
            representation: self.representation,
        }
    }
}
