use axum::extract::{Path, State};
use axum::Json;

use storybook_core::catalog::CatalogKind;
use storybook_db::models::catalog::CatalogEntry;
use storybook_db::repositories::CatalogRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /catalog/{kind} -- active entries of one wizard pick-list.
pub async fn list_catalog(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> AppResult<Json<DataResponse<Vec<CatalogEntry>>>> {
    let kind = CatalogKind::from_slug(&kind)?;
    let entries = CatalogRepo::list_active(&state.pool, kind).await?;
    tracing::debug!(catalog = kind.table(), count = entries.len(), "Catalog listed");
    Ok(Json(DataResponse { data: entries }))
}
