use axum::routing::get;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Profile routes -- mounted at `/profile`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(profile::get_profile).put(profile::upsert_profile))
}
