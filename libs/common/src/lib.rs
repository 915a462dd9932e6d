//! Common library for the authenticator workspace
//!
//! This crate provides shared infrastructure used by the services in the
//! workspace: PostgreSQL connectivity, error types and logging setup.

pub mod database;
pub mod error;
pub mod telemetry;
