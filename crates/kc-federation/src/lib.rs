//! # kc-federation
//!
//! Role storage federation for Keycloak Rust.
//!
//! Roles live in an external relational store. This crate lets the host
//! read them as if they were its own and keeps the store in step with
//! role lifecycle events raised by the admin interface.
//!
//! ## Components
//!
//! - [`StorageId`] - namespaced identifiers handed to the host
//! - [`RoleStorageProvider`] - lookups and paginated searches
//! - [`FederatedRole`] - host-facing projection of one stored role
//! - [`RoleEventListener`] - applies admin events to the store
//! - [`factory`] - provider factories sharing one database service

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod factory;
pub mod host;
pub mod listener;
pub mod model;
pub mod path;
pub mod provider;
pub mod storage_id;
pub mod sync;

pub use config::{ComponentModel, ConfigProperty, ProviderConfig};
pub use error::{FederationError, FederationResult};
pub use factory::{RoleEventListenerFactory, RoleStorageProviderFactory, SharedDatabase};
pub use host::{HostModel, HostRole, InMemoryHostModel};
pub use listener::RoleEventListener;
pub use model::{FederatedRole, RoleContainer};
pub use path::{parse_role_path, RolePath};
pub use provider::RoleStorageProvider;
pub use storage_id::StorageId;
pub use sync::{SkipReason, SyncOutcome, SyncReport};
