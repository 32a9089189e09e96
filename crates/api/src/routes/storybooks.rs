//! Mounted at `/storybooks`.
//!
//! ```text
//! GET    /                              list_storybooks (?limit, offset)
//! GET    /{id}                          get_storybook
//! ```

use axum::routing::get;
use axum::Router;

use crate::handlers::storybooks;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(storybooks::list_storybooks))
        .route("/{id}", get(storybooks::get_storybook))
}
