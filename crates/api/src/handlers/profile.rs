//! The signed-in user's profile.

use axum::extract::State;
use axum::Json;

use storybook_core::error::CoreError;
use storybook_db::models::profile::{Profile, UpsertProfile};
use storybook_db::repositories::ProfileRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Profile>>> {
    let profile = ProfileRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Profile",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /profile -- create or update; the email always comes from the token.
pub async fn upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpsertProfile>,
) -> AppResult<Json<DataResponse<Profile>>> {
    let profile =
        ProfileRepo::upsert(&state.pool, auth.user_id, auth.email.as_deref(), &body).await?;
    tracing::info!(user_id = %auth.user_id, "Profile saved");
    Ok(Json(DataResponse { data: profile }))
}
