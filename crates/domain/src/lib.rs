//! Domain layer for the marketplace admin backend.
//!
//! This crate contains:
//! - Domain models (settings, content versions, media assets, audit entries)
//! - Store traits with in-memory implementations
//! - Business logic services and the [`AdminContext`] that wires them

pub mod context;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

mod sync;

pub use context::{AdminContext, AdminOptions, Stores};
pub use error::{DomainError, DomainResult, StoreError, StoreResult};
