use axum::routing::get;
use axum::Router;

use crate::handlers::catalog;
use crate::state::AppState;

/// Catalog routes -- mounted at `/catalog`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{kind}", get(catalog::list_catalog))
}
