//! Client domain model.
//!
//! Clients represent applications registered in a realm. Client-scoped
//! roles reference a client by its internal `id`, not by the OAuth
//! `client_id`.

use serde::{Deserialize, Serialize};

/// A client as seen from the host model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Internal client identifier (what role records store).
    pub id: String,
    /// Realm this client belongs to.
    pub realm_id: String,
    /// OAuth `client_id` (human readable).
    pub client_id: String,
    /// Display name.
    pub name: Option<String>,
}

impl Client {
    /// Creates a new client view.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        realm_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            realm_id: realm_id.into(),
            client_id: client_id.into(),
            name: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
