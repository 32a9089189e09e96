//! Mounted at `/webhooks`.
//!
//! ```text
//! POST   /stripe                        handle_stripe_event
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::stripe_webhook;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", post(stripe_webhook::handle_stripe_event))
}
