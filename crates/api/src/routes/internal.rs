//! Mounted at `/internal`. Not for browsers: every request must carry the
//! automation's shared secret.
//!
//! ```text
//! POST   /storybooks/{id}/result        record_result
//! ```

use axum::routing::post;
use axum::Router;

use crate::handlers::internal;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/storybooks/{id}/result", post(internal::record_result))
}
