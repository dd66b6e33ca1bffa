//! # kc-storage
//!
//! Storage abstraction for the external role store.
//!
//! This crate defines the persistence gateway contract that concrete
//! backends (the `SQLx` gateway in `kc-storage-sql`, the in-memory
//! gateway in [`memory`]) implement.
//!
//! ## Provider Traits
//!
//! - [`RoleRepository`] - transactional CRUD and lookups for role records

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod role;

pub use error::{StorageError, StorageResult};
pub use memory::InMemoryRoleRepository;
pub use role::RoleRepository;
