use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use storybook_core::error::CoreError;
use storybook_integrations::{ForwardError, PaymentError, StorageError};

/// Error returned by every HTTP handler.
///
/// Domain failures arrive as [`CoreError`]; the remaining variants cover
/// lookups by non-id keys, malformed requests and the outbound services
/// (Stripe, the automation webhook, photo storage). The response body is
/// always `{ "error": <message>, "code": <CODE> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A resource looked up by something other than its id, such as a
    /// checkout session.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stripe, the automation webhook or object storage failed. The detail
    /// is logged, never returned.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        AppError::Upstream(format!("Payment provider error: {err}"))
    }
}

impl From<ForwardError> for AppError {
    fn from(err: ForwardError) -> Self {
        AppError::Upstream(format!("Order forwarding failed: {err}"))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Upstream(format!("Photo storage failed: {err}"))
    }
}

type ErrorParts = (StatusCode, &'static str, String);

fn internal(detail: &dyn std::fmt::Display) -> ErrorParts {
    tracing::error!(error = %detail, "Internal error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn core_parts(err: &CoreError) -> ErrorParts {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Internal(msg) => internal(msg),
    }
}

impl AppError {
    fn parts(&self) -> ErrorParts {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Upstream service failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "A downstream service failed. Please try again".to_string(),
                )
            }
            AppError::InternalError(msg) => internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        (status, axum::Json(json!({ "error": message, "code": code }))).into_response()
    }
}

/// Map a sqlx error onto the API's error codes.
///
/// `RowNotFound` is 404 and unique violations on `uq_` constraints are 409.
/// Anything else is a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        // 23505: unique_violation
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            match db_err.constraint() {
                Some("uq_storybooks_stripe_session_id") => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    "An order already exists for this checkout session".to_string(),
                ),
                Some(name) if name.starts_with("uq_") => (
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {name}"),
                ),
                _ => internal(db_err),
            }
        }
        other => internal(other),
    }
}
