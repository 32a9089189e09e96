//! Checkout: turn a completed wizard into a pending order and a hosted
//! payment page.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use storybook_core::checkout::{self, METADATA_WIZARD_SESSION};
use storybook_core::storybook::StorybookStatus;
use storybook_core::types::DbId;
use storybook_db::models::storybook::{CreateStorybook, StorybookStatusView};
use storybook_db::repositories::{StorybookRepo, WizardSessionRepo};
use storybook_integrations::CheckoutRequest;

use crate::error::{AppError, AppResult};
use crate::handlers::wizard::load_editable_session;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Where the client sends the browser next.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: String,
    pub storybook_id: DbId,
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/checkout
// ---------------------------------------------------------------------------

/// Validate the wizard, open a Stripe checkout session and record the order.
///
/// Validation failures return before Stripe is called. The order row and its
/// characters are written in one transaction after Stripe answers.
pub async fn create_checkout(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CheckoutResponse>>> {
    let session = load_editable_session(&state, id, auth.as_ref()).await?;
    let order = checkout::validate_for_checkout(&session.data.0)?;

    let mut metadata = order.to_metadata();
    metadata.push((METADATA_WIZARD_SESSION.to_string(), id.to_string()));

    let checkout_session = state
        .payments
        .create_checkout_session(&CheckoutRequest {
            customer_email: order.email.clone(),
            metadata,
        })
        .await
        .inspect_err(|e| {
            tracing::error!(session_id = %id, error = %e, "Checkout session creation failed");
        })?;

    let input = CreateStorybook::from_order(
        &order,
        session.user_id,
        StorybookStatus::PendingPayment.as_str(),
        &checkout_session.session_id,
    );
    let (storybook, characters) =
        StorybookRepo::create_with_characters(&state.pool, &input, &order.characters)
            .await
            .inspect_err(|e| {
                // The Stripe session stays open; the webhook rebuilds the row
                // from metadata if the customer pays.
                tracing::error!(
                    session_id = %id,
                    stripe_session_id = %checkout_session.session_id,
                    error = %e,
                    "Failed to record order after creating checkout session"
                );
            })?;

    if let Err(e) = WizardSessionRepo::mark_submitted(&state.pool, id).await {
        tracing::warn!(session_id = %id, error = %e, "Failed to mark wizard session submitted");
    }

    tracing::info!(
        session_id = %id,
        storybook_id = %storybook.id,
        stripe_session_id = %checkout_session.session_id,
        characters = characters.len(),
        "Checkout session created"
    );

    Ok(Json(DataResponse {
        data: CheckoutResponse {
            session_id: checkout_session.session_id,
            url: checkout_session.url,
            storybook_id: storybook.id,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /checkout/sessions/{session_id}
// ---------------------------------------------------------------------------

/// Public status lookup for the success page.
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<DataResponse<StorybookStatusView>>> {
    let status = StorybookRepo::find_status_by_session_id(&state.pool, &session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No order for checkout session {session_id}")))?;

    tracing::debug!(storybook_id = %status.id, status = %status.status, "Checkout status fetched");
    Ok(Json(DataResponse { data: status }))
}
