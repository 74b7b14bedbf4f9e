//! Shared utilities and common types for the marketplace admin backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing utilities (checksums, derived identifiers)
//! - Common validation logic for keys, identifiers and file names
//! - Offset pagination helpers

pub mod crypto;
pub mod pagination;
pub mod validation;
