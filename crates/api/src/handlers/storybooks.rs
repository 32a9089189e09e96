//! The account page: a user's storybooks and their generated pages.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;

use storybook_core::error::CoreError;
use storybook_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use storybook_core::types::DbId;
use storybook_db::models::character::Character;
use storybook_db::models::storybook::Storybook;
use storybook_db::repositories::{CharacterRepo, StoryImageRepo, StorybookRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct StorybookPage {
    pub items: Vec<Storybook>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Serialize)]
pub struct StoryImageView {
    pub page_number: i32,
    pub image_path: String,
    pub url: String,
}

/// One storybook with everything the detail page renders.
#[derive(Debug, Serialize)]
pub struct StorybookDetail {
    #[serde(flatten)]
    pub storybook: Storybook,
    pub child_photo_url: Option<String>,
    pub cover_photo_url: Option<String>,
    pub pdf_url: Option<String>,
    pub characters: Vec<Character>,
    pub images: Vec<StoryImageView>,
}

// ---------------------------------------------------------------------------
// GET /storybooks
// ---------------------------------------------------------------------------

/// The caller's storybooks, newest first.
pub async fn list_storybooks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<StorybookPage>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let items = StorybookRepo::list_by_user(&state.pool, auth.user_id, limit, offset).await?;
    let total = StorybookRepo::count_by_user(&state.pool, auth.user_id).await?;

    tracing::debug!(user_id = %auth.user_id, count = items.len(), total, "Storybooks listed");

    Ok(Json(DataResponse {
        data: StorybookPage {
            items,
            total,
            limit,
            offset,
        },
    }))
}

// ---------------------------------------------------------------------------
// GET /storybooks/{id}
// ---------------------------------------------------------------------------

pub async fn get_storybook(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<StorybookDetail>>> {
    let storybook = StorybookRepo::find_owned(&state.pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Storybook",
            id,
        }))?;

    let characters = CharacterRepo::list_by_storybook(&state.pool, id).await?;
    let images = StoryImageRepo::list_by_storybook(&state.pool, id)
        .await?
        .into_iter()
        .map(|img| StoryImageView {
            url: state.storage.public_url(&img.image_path),
            page_number: img.page_number,
            image_path: img.image_path,
        })
        .collect();

    let url = |path: &Option<String>| path.as_deref().map(|p| state.storage.public_url(p));

    Ok(Json(DataResponse {
        data: StorybookDetail {
            child_photo_url: url(&storybook.child_photo_path),
            cover_photo_url: url(&storybook.cover_photo_path),
            pdf_url: url(&storybook.pdf_path),
            storybook,
            characters,
            images,
        },
    }))
}
