//! Federation provider configuration.
//!
//! Configuration types for the role storage provider component and the
//! descriptors the admin console renders for it.

use std::collections::HashMap;

use kc_core::config::keys;
use serde::{Deserialize, Serialize};

use crate::error::{FederationError, FederationResult};

/// Component key enabling strict realm-role search.
pub const STRICT_REALM_SEARCH: &str = "strictRealmSearch";

/// A configured provider component as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentModel {
    /// Component instance identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Factory identifier this component was created from.
    pub provider_id: String,
    /// Component-specific configuration.
    pub config: HashMap<String, String>,
}

impl ComponentModel {
    /// Creates a new component model.
    #[must_use]
    pub fn new(id: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            provider_id: provider_id.into(),
            config: HashMap::new(),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a config value.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Gets a config value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Gets a config value as bool.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(|v| v.trim().parse().ok())
    }
}

/// Runtime configuration of one role storage provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Component identifier used as the storage id namespace.
    pub component_id: String,

    /// Display name.
    pub name: String,

    /// Restrict realm-role searches to realm-scoped rows.
    ///
    /// Off by default: a search term also matches client roles of the
    /// realm, which is what existing deployments rely on.
    #[serde(default)]
    pub strict_realm_search: bool,
}

impl ProviderConfig {
    /// Creates a configuration for the given component.
    #[must_use]
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            name: String::new(),
            strict_realm_search: false,
        }
    }

    /// Builds the configuration from a stored component.
    #[must_use]
    pub fn from_component(component: &ComponentModel) -> Self {
        Self {
            component_id: component.id.clone(),
            name: component.name.clone(),
            strict_realm_search: component.get_bool(STRICT_REALM_SEARCH).unwrap_or(false),
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enables or disables strict realm search.
    #[must_use]
    pub const fn strict_realm_search(mut self, strict: bool) -> Self {
        self.strict_realm_search = strict;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the component id is empty or contains `:`,
    /// which would make storage ids ambiguous.
    pub fn validate(&self) -> FederationResult<()> {
        if self.component_id.trim().is_empty() {
            return Err(FederationError::config("component id must not be empty"));
        }
        if self.component_id.contains(':') {
            return Err(FederationError::config(format!(
                "component id '{}' must not contain ':'",
                self.component_id
            )));
        }
        Ok(())
    }
}

/// Input widget type of a config property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyKind {
    /// Free text.
    String,
    /// Masked secret.
    Password,
    /// On/off switch.
    Boolean,
}

/// Describes one configurable setting of a provider factory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigProperty {
    /// Config key.
    pub name: &'static str,
    /// Label shown to administrators.
    pub label: &'static str,
    /// Help text.
    pub help_text: &'static str,
    /// Widget type.
    pub kind: PropertyKind,
    /// Default value.
    pub default_value: Option<&'static str>,
}

impl ConfigProperty {
    const fn new(
        name: &'static str,
        label: &'static str,
        help_text: &'static str,
        kind: PropertyKind,
        default_value: &'static str,
    ) -> Self {
        Self {
            name,
            label,
            help_text,
            kind,
            default_value: Some(default_value),
        }
    }
}

/// Settings exposed by the role storage provider factory.
#[must_use]
pub fn database_properties() -> Vec<ConfigProperty> {
    vec![
        ConfigProperty::new(
            keys::COMPONENT_URL,
            "Database URL",
            "JDBC URL for the PostgreSQL database",
            PropertyKind::String,
            "jdbc:postgresql://host.docker.internal:5432/user_store",
        ),
        ConfigProperty::new(
            keys::COMPONENT_USERNAME,
            "Database Username",
            "Username for database connection",
            PropertyKind::String,
            "postgres",
        ),
        ConfigProperty::new(
            keys::COMPONENT_PASSWORD,
            "Database Password",
            "Password for database connection",
            PropertyKind::Password,
            "root",
        ),
        ConfigProperty::new(
            keys::COMPONENT_DRIVER,
            "Database Driver",
            "JDBC driver class name",
            PropertyKind::String,
            "org.postgresql.Driver",
        ),
        ConfigProperty::new(
            STRICT_REALM_SEARCH,
            "Strict Realm Search",
            "Only return realm roles from realm role searches",
            PropertyKind::Boolean,
            "false",
        ),
    ]
}
