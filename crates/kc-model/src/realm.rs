//! Realm domain model.
//!
//! Realms are owned by the host; this is the read-only view a role
//! needs to resolve its container.

use serde::{Deserialize, Serialize};

/// A realm as seen from the host model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Realm {
    /// Realm identifier.
    pub id: String,
    /// Realm name (unique).
    pub name: String,
    /// Whether the realm is enabled.
    pub enabled: bool,
}

impl Realm {
    /// Creates a new enabled realm view.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
        }
    }
}
