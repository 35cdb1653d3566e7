//! Shared types for the apicanon workspace
//!
//! This crate holds the value types that both the emitter core and the CLI
//! use to name things across the whole catalog.

pub mod decl_ref;

// Re-export commonly used types
pub use decl_ref::{DeclRef, DeclRefError, KEY_SEPARATOR};
