//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - Field names are camelCase.
//! - Password hashes and approval flags are never exposed.

pub mod auth;
pub mod student;
pub mod vote;
