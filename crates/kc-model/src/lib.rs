//! # kc-model
//!
//! Domain models for the external role store.
//!
//! - [`Role`] is the persisted role record.
//! - [`Realm`] and [`Client`] are the minimal views of the host's own
//!   model that role scoping needs.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod client;
pub mod realm;
pub mod role;

pub use client::Client;
pub use realm::Realm;
pub use role::Role;
