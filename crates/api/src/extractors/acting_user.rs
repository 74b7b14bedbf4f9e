//! Acting-user header extractor.
//!
//! Authentication happens upstream of this service; handlers only need to
//! know who to attribute a change to.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the id of the admin performing the request.
pub const ADMIN_USER_HEADER: &str = "x-admin-user-id";

/// The optional user a mutation is attributed to.
///
/// A missing or empty header yields `None`; a header that is not a UUID is
/// rejected with 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActingUser(pub Option<Uuid>);

impl ActingUser {
    pub fn id(&self) -> Option<Uuid> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ADMIN_USER_HEADER) else {
            return Ok(ActingUser(None));
        };

        let raw = value
            .to_str()
            .map_err(|_| ApiError::Validation("X-Admin-User-Id must be ASCII".into()))?
            .trim();
        if raw.is_empty() {
            return Ok(ActingUser(None));
        }

        Uuid::parse_str(raw)
            .map(|id| ActingUser(Some(id)))
            .map_err(|_| ApiError::Validation("X-Admin-User-Id must be a UUID".into()))
    }
}
