//! JWT-based authentication extractors for Axum handlers.

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use storybook_core::error::CoreError;
use storybook_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from a Bearer token in the `Authorization` header.
///
/// Use `Option<AuthUser>` on endpoints that also serve anonymous visitors: a
/// missing header yields `None`, a present but invalid token is still a 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The auth user's uuid (from `claims.sub`).
    pub user_id: DbId,
    /// Account email from the token.
    pub email: Option<String>,
}

impl AuthUser {
    /// The token email, required by endpoints that match orders by email.
    pub fn require_email(&self) -> Result<&str, AppError> {
        self.email.as_deref().ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(
                "Your account has no email address".into(),
            ))
        })
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = parts.headers.get("authorization") else {
        return Ok(None);
    };
    let auth_header = auth_header.to_str().map_err(|_| {
        AppError::Core(CoreError::Unauthorized("Malformed Authorization header".into()))
    })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized(
            "Invalid Authorization format. Expected: Bearer <token>".into(),
        ))
    })?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    Ok(Some(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    }))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)?.ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing Authorization header".into(),
            ))
        })
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        authenticate(parts, state)
    }
}
