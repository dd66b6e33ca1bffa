//! Integration tests for the role storage crates.
//!
//! The tests live under `tests/`. Run the PostgreSQL tests with
//! `--ignored`; they need a Docker daemon.

#![forbid(unsafe_code)]
