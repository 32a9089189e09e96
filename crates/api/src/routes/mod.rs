pub mod catalog;
pub mod checkout;
pub mod health;
pub mod internal;
pub mod orders;
pub mod profile;
pub mod storybooks;
pub mod webhooks;
pub mod wizard;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /wizard-sessions                                 create (optional auth)
/// /wizard-sessions/{id}                            get
/// /wizard-sessions/{id}/actions                    apply reducer action (POST)
/// /wizard-sessions/{id}/advance                    next step (POST)
/// /wizard-sessions/{id}/go-back                    previous step (POST)
/// /wizard-sessions/{id}/photo                      multipart photo upload (POST)
/// /wizard-sessions/{id}/checkout                   create checkout session (POST)
///
/// /checkout/sessions/{session_id}                  public order status
///
/// /webhooks/stripe                                 Stripe events (signed)
///
/// /orders/claim                                    attach a paid order (requires auth)
///
/// /storybooks                                      caller's storybooks (requires auth)
/// /storybooks/{id}                                 one storybook with pages
///
/// /catalog/{kind}                                  wizard pick-lists
///
/// /profile                                         get, upsert (requires auth)
///
/// /internal/storybooks/{id}/result                 automation callback (shared secret)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Wizard drafts, photo upload and checkout.
        .nest("/wizard-sessions", wizard::router())
        // Success-page status lookup.
        .nest("/checkout", checkout::router())
        // Payment provider callbacks.
        .nest("/webhooks", webhooks::router())
        // Order ownership.
        .nest("/orders", orders::router())
        // Account page.
        .nest("/storybooks", storybooks::router())
        .nest("/profile", profile::router())
        // Wizard pick-lists.
        .nest("/catalog", catalog::router())
        // Story-generation automation callbacks.
        .nest("/internal", internal::router())
}
