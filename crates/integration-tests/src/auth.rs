//! Bearer token checks for the stub backend.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use emporium_core::User;
use serde_json::json;

use crate::state::StubState;

/// Extractor that requires a bearer token belonging to a staff user.
///
/// A missing or unknown token is rejected with 401; a valid token of a
/// non-staff user with 403.
pub struct RequireStaff(pub User);

/// Why a request was refused.
pub enum AuthRejection {
    Unauthenticated,
    NotStaff,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "detail": "Authentication credentials were not provided." })),
            )
                .into_response(),
            Self::NotStaff => (
                StatusCode::FORBIDDEN,
                Json(json!({ "error": "Admin access required" })),
            )
                .into_response(),
        }
    }
}

/// The token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<StubState> for RequireStaff {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &StubState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::Unauthenticated)?;

        let user = state
            .store()
            .await
            .user_for_token(token)
            .cloned()
            .ok_or(AuthRejection::Unauthenticated)?;

        if !user.is_staff {
            return Err(AuthRejection::NotStaff);
        }
        Ok(Self(user))
    }
}
