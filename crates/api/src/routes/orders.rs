//! Mounted at `/orders`.
//!
//! ```text
//! POST   /claim                         claim_order
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::orders;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/claim", post(orders::claim_order))
}
