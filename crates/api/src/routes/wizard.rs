//! Route definitions for the storybook wizard.
//!
//! Mounted at `/wizard-sessions` by `api_routes()`.
//!
//! ```text
//! POST   /                              create_session
//! GET    /{id}                          get_session
//! POST   /{id}/actions                  apply_action
//! POST   /{id}/advance                  advance_step
//! POST   /{id}/go-back                  go_back
//! POST   /{id}/photo                    upload_photo (multipart)
//! POST   /{id}/checkout                 create_checkout
//! ```

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{checkout, photo, wizard};
use crate::state::AppState;

/// Wizard routes -- mounted at `/wizard-sessions`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(wizard::create_session))
        .route("/{id}", get(wizard::get_session))
        .route("/{id}/actions", post(wizard::apply_action))
        .route("/{id}/advance", post(wizard::advance_step))
        .route("/{id}/go-back", post(wizard::go_back))
        .route("/{id}/photo", post(photo::upload_photo))
        .route("/{id}/checkout", post(checkout::create_checkout))
}
