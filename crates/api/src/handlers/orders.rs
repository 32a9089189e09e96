//! Attaching a paid order to the signed-in account.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use storybook_core::claim::{self, ClaimDecision};
use storybook_core::error::CoreError;
use storybook_db::models::storybook::Storybook;
use storybook_db::repositories::StorybookRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClaimOrderRequest {
    /// Stripe checkout session id from the success redirect.
    pub session_id: String,
}

// ---------------------------------------------------------------------------
// POST /orders/claim
// ---------------------------------------------------------------------------

/// Claim the order created by a checkout session.
///
/// Repeating a successful claim returns the same row.
pub async fn claim_order(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<ClaimOrderRequest>,
) -> AppResult<Json<DataResponse<Storybook>>> {
    let email = auth.require_email()?;

    let storybook = StorybookRepo::find_by_session_id(&state.pool, &body.session_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No order for checkout session {}", body.session_id))
        })?;

    let claimed = match claim::evaluate_claim(&storybook.email, storybook.user_id, auth.user_id, email)
        .inspect_err(|e| {
            tracing::warn!(
                storybook_id = %storybook.id,
                user_id = %auth.user_id,
                reason = %e,
                "Order claim refused"
            );
        })? {
        ClaimDecision::AlreadyOwned => storybook,
        ClaimDecision::Assign => StorybookRepo::claim(&state.pool, storybook.id, auth.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "This order is already linked to another account".into(),
                ))
            })?,
    };

    tracing::info!(
        storybook_id = %claimed.id,
        user_id = %auth.user_id,
        "Order claimed"
    );

    Ok(Json(DataResponse { data: claimed }))
}
