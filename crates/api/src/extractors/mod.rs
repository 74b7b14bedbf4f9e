//! Custom Axum extractors.

pub mod acting_user;

pub use acting_user::{ActingUser, ADMIN_USER_HEADER};
