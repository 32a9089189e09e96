//! Callbacks from the story-generation automation.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use storybook_core::error::CoreError;
use storybook_core::storybook::GenerationOutcome;
use storybook_core::types::DbId;
use storybook_core::webhook_signature::secrets_match;
use storybook_db::models::story_image::CreateStoryImage;
use storybook_db::models::storybook::Storybook;
use storybook_db::repositories::StorybookRepo;
use storybook_integrations::automation::AUTOMATION_SECRET_HEADER;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of the generation result callback.
#[derive(Debug, Deserialize)]
pub struct GenerationResult {
    pub status: GenerationOutcome,
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default)]
    pub cover_photo_path: Option<String>,
    /// Generated pages; when non-empty they replace the stored ones.
    #[serde(default)]
    pub images: Vec<CreateStoryImage>,
}

fn check_secret(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let presented = headers
        .get(AUTOMATION_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let expected = state.config.automation.secret.as_deref().unwrap_or_default();

    if secrets_match(presented, expected) {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Unauthorized(
            "Invalid automation secret".into(),
        )))
    }
}

// ---------------------------------------------------------------------------
// POST /internal/storybooks/{id}/result
// ---------------------------------------------------------------------------

/// Record a finished (or failed) generation.
pub async fn record_result(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<DbId>,
    Json(body): Json<GenerationResult>,
) -> AppResult<Json<DataResponse<Storybook>>> {
    check_secret(&state, &headers)?;

    let storybook = StorybookRepo::record_generation_result(
        &state.pool,
        id,
        body.status.status(),
        body.pdf_path.as_deref(),
        body.cover_photo_path.as_deref(),
        &body.images,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Storybook",
        id,
    }))?;

    match body.status {
        GenerationOutcome::Done => tracing::info!(
            storybook_id = %id,
            pages = body.images.len(),
            "Storybook generated"
        ),
        GenerationOutcome::Error => {
            tracing::warn!(storybook_id = %id, "Storybook generation failed")
        }
    }

    Ok(Json(DataResponse { data: storybook }))
}
