//! Mounted at `/checkout`.
//!
//! ```text
//! GET    /sessions/{session_id}         get_session_status
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::checkout;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/sessions/{session_id}", get(checkout::get_session_status))
}
