//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use stratus_core::error::AppError;
use stratus_core::types::OwnerId;
use stratus_service::RequestContext;

use crate::error::ApiError;

/// Header carrying the authenticated user's id, set by the fronting auth
/// layer after it has validated the session.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user, extracted from [`USER_ID_HEADER`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::validation("Missing x-user-id header"))?;

        let owner: OwnerId = header
            .to_str()
            .ok()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| AppError::validation("Invalid x-user-id header"))?;

        Ok(Self(RequestContext::new(owner.into_uuid())))
    }
}
