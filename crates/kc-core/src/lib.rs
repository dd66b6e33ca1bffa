//! # kc-core
//!
//! Core utilities, configuration, and error handling shared by the
//! external role storage crates.
//!
//! - [`config`] resolves the database connection tuple from the
//!   component/property/environment fallback chain.
//! - [`event`] models the administrative lifecycle notifications the
//!   host delivers for role create/update/delete operations.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::{ConfigSources, DatabaseConfig, DatabaseDriver};
pub use error::{Error, Result};
pub use event::{AdminEvent, OperationType, ResourceType};
