//! Stripe webhook endpoint.
//!
//! Only `checkout.session.completed` is acted on. Handling is idempotent per
//! checkout session: the order row is created at most once (unique
//! `stripe_session_id`), forwarded to the automation, and only then marked
//! `payment_received`. A forwarding failure leaves the row unpaid and answers
//! 502 so Stripe redelivers the event.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use storybook_core::checkout::{OrderDetails, METADATA_WIZARD_SESSION};
use storybook_core::storybook::{is_awaiting_payment, StorybookStatus};
use storybook_core::types::DbId;
use storybook_core::webhook_signature::{self, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER};
use storybook_db::models::storybook::{CreateStorybook, Storybook};
use storybook_db::repositories::{CharacterRepo, StorybookRepo, WizardSessionRepo};
use storybook_integrations::stripe::{CompletedCheckoutSession, StripeEvent};
use storybook_integrations::{ForwardedCharacter, ForwardedOrder};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// What the webhook did with an event.
#[derive(Debug, Serialize)]
pub struct WebhookOutcome {
    /// `ignored`, `already_processed` or `processed`.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storybook_id: Option<DbId>,
}

impl WebhookOutcome {
    fn ignored() -> Self {
        Self {
            status: "ignored",
            storybook_id: None,
        }
    }

    fn already_processed(id: DbId) -> Self {
        Self {
            status: "already_processed",
            storybook_id: Some(id),
        }
    }

    fn processed(id: DbId) -> Self {
        Self {
            status: "processed",
            storybook_id: Some(id),
        }
    }
}

// ---------------------------------------------------------------------------
// POST /webhooks/stripe
// ---------------------------------------------------------------------------

pub async fn handle_stripe_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<WebhookOutcome>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".into()))?;

    webhook_signature::verify_signature(
        &body,
        signature,
        &state.config.stripe.webhook_secret,
        chrono::Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .inspect_err(|e| tracing::warn!(error = %e, "Rejected Stripe webhook"))?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed event payload: {e}")))?;

    if !event.is_checkout_completed() {
        tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Stripe event ignored");
        return Ok(Json(DataResponse {
            data: WebhookOutcome::ignored(),
        }));
    }

    let checkout = event
        .checkout_session()
        .map_err(|e| AppError::BadRequest(format!("Malformed checkout session: {e}")))?;

    let storybook = match StorybookRepo::find_by_session_id(&state.pool, &checkout.id).await? {
        Some(row) => row,
        None => insert_from_metadata(&state, &checkout).await?,
    };

    if !is_awaiting_payment(&storybook.status) {
        tracing::info!(
            storybook_id = %storybook.id,
            stripe_session_id = %checkout.id,
            status = %storybook.status,
            "Checkout already processed"
        );
        return Ok(Json(DataResponse {
            data: WebhookOutcome::already_processed(storybook.id),
        }));
    }

    let order = forwarded_order(&state, &storybook).await?;
    state.forwarder.forward(&order).await.inspect_err(|e| {
        tracing::error!(
            storybook_id = %storybook.id,
            stripe_session_id = %checkout.id,
            error = %e,
            "Failed to forward paid order"
        );
    })?;

    let outcome = match StorybookRepo::mark_payment_received(&state.pool, storybook.id).await? {
        Some(paid) => {
            tracing::info!(
                storybook_id = %paid.id,
                stripe_session_id = %checkout.id,
                "Payment received"
            );
            WebhookOutcome::processed(paid.id)
        }
        // A concurrent delivery got there first.
        None => WebhookOutcome::already_processed(storybook.id),
    };

    Ok(Json(DataResponse { data: outcome }))
}

/// Record an order the checkout endpoint never wrote, from session metadata.
async fn insert_from_metadata(
    state: &AppState,
    checkout: &CompletedCheckoutSession,
) -> AppResult<Storybook> {
    let order = OrderDetails::from_metadata(&checkout.metadata, checkout.email())?;
    let input = CreateStorybook::from_order(
        &order,
        None,
        StorybookStatus::PendingPayment.as_str(),
        &checkout.id,
    );

    let storybook = match StorybookRepo::insert_for_session_if_absent(&state.pool, &input).await? {
        Some(row) => {
            tracing::warn!(
                storybook_id = %row.id,
                stripe_session_id = %checkout.id,
                "Order rebuilt from checkout metadata"
            );
            row
        }
        None => StorybookRepo::find_by_session_id(&state.pool, &checkout.id)
            .await?
            .ok_or_else(|| {
                AppError::InternalError(format!(
                    "Order for checkout session {} disappeared after insert",
                    checkout.id
                ))
            })?,
    };

    if let Some(session_id) = checkout
        .metadata
        .get(METADATA_WIZARD_SESSION)
        .and_then(|v| v.parse::<DbId>().ok())
    {
        if let Err(e) = WizardSessionRepo::mark_submitted(&state.pool, session_id).await {
            tracing::warn!(session_id = %session_id, error = %e, "Failed to mark wizard session submitted");
        }
    }

    Ok(storybook)
}

/// Flatten a storybook and its characters for the automation.
async fn forwarded_order(state: &AppState, storybook: &Storybook) -> AppResult<ForwardedOrder> {
    let characters = CharacterRepo::list_by_storybook(&state.pool, storybook.id).await?;
    let url = |path: &Option<String>| path.as_deref().map(|p| state.storage.public_url(p));

    Ok(ForwardedOrder {
        storybook_id: storybook.id,
        stripe_session_id: storybook.stripe_session_id.clone().unwrap_or_default(),
        email: storybook.email.clone(),
        child_name: storybook.child_name.clone(),
        child_gender: storybook.child_gender.clone(),
        age_category: storybook.age_category.clone(),
        theme: storybook.theme.clone(),
        subject: storybook.subject.clone(),
        message: storybook.message.clone(),
        style: storybook.style.clone(),
        custom_note: storybook.custom_note.clone(),
        child_photo_url: url(&storybook.child_photo_path),
        characters: characters
            .iter()
            .map(|c| ForwardedCharacter {
                name: c.name.clone(),
                relation: c.relation.clone(),
                gender: c.gender.clone(),
                photo_url: url(&c.photo_path),
            })
            .collect(),
    })
}
