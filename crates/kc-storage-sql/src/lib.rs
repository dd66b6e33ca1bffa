//! # kc-storage-sql
//!
//! SQLx-based storage implementation for the external role store.
//!
//! This crate provides the `PostgreSQL` persistence gateway
//! ([`PgRoleRepository`]) and the pooled [`DatabaseService`] it runs on.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

mod convert;
mod entities;
mod error;
pub mod pool;
pub mod role;

pub use pool::{DatabaseService, PoolConfig};
pub use role::PgRoleRepository;
