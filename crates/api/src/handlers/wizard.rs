//! Handlers for the storybook wizard.
//!
//! A wizard session is the server-side draft of one order. Every change goes
//! through [`wizard::reduce`] against the locked row and the result is
//! written back with previews stripped. A failed write after a successful
//! reduce does not fail the request: the new state is returned with
//! `persisted: false` so the client can warn the user.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use storybook_core::error::CoreError;
use storybook_core::types::{DbId, Timestamp};
use storybook_core::wizard::{self, WizardAction, WizardData, WizardStep};
use storybook_db::models::wizard_session::WizardSession;
use storybook_db::repositories::WizardSessionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A wizard session as returned to the client.
///
/// `data` may carry photo previews that were never written to the database.
#[derive(Debug, Serialize)]
pub struct WizardSessionView {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub current_step: i32,
    pub step: Option<WizardStep>,
    pub status: String,
    pub data: WizardData,
    /// Whether `data` matches what is stored.
    pub persisted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WizardSessionView {
    pub fn new(session: WizardSession, data: WizardData, persisted: bool) -> Self {
        let step = u8::try_from(session.current_step)
            .ok()
            .and_then(|n| WizardStep::from_number(n).ok());
        Self {
            id: session.id,
            user_id: session.user_id,
            current_step: session.current_step,
            step,
            status: session.status,
            data,
            persisted,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }

    fn stored(session: WizardSession) -> Self {
        let data = session.data.0.clone();
        Self::new(session, data, true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a session the caller may access.
///
/// Anonymous sessions are reachable by id alone; a session created by a
/// signed-in user only by that user.
pub(crate) async fn load_session(
    state: &AppState,
    id: DbId,
    auth: Option<&AuthUser>,
) -> AppResult<WizardSession> {
    let session = WizardSessionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WizardSession",
            id,
        }))?;

    if let Some(owner) = session.user_id {
        if auth.map(|a| a.user_id) != Some(owner) {
            return Err(AppError::Core(CoreError::Forbidden(
                "This wizard session belongs to another account".into(),
            )));
        }
    }
    Ok(session)
}

/// Load a session that can still be edited.
pub(crate) async fn load_editable_session(
    state: &AppState,
    id: DbId,
    auth: Option<&AuthUser>,
) -> AppResult<WizardSession> {
    let session = load_session(state, id, auth).await?;
    wizard::ensure_in_progress(&session.status)?;
    Ok(session)
}

/// Apply `change` to the stored wizard data under a row lock.
///
/// Database failures are logged and reported as `Ok(None)`; the caller
/// still answers with its in-memory state. Errors raised by `change` itself
/// are returned.
pub(crate) async fn update_stored<F>(
    state: &AppState,
    id: DbId,
    change: F,
) -> AppResult<Option<(WizardSession, WizardData)>>
where
    F: FnOnce(&mut WizardData) -> AppResult<()>,
{
    match WizardSessionRepo::update_data(&state.pool, id, change).await {
        Ok(Some(stored)) => Ok(Some(stored)),
        Ok(None) => {
            tracing::warn!(session_id = %id, "Wizard session vanished before save");
            Ok(None)
        }
        Err(AppError::Database(e)) => {
            tracing::warn!(session_id = %id, error = %e, "Failed to persist wizard state");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions
// ---------------------------------------------------------------------------

/// Start a new, empty wizard. Signed-in callers own the session.
pub async fn create_session(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
) -> AppResult<impl IntoResponse> {
    let user_id = auth.map(|a| a.user_id);
    let session = WizardSessionRepo::create(&state.pool, user_id).await?;

    tracing::info!(session_id = %session.id, user_id = ?user_id, "Wizard session created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: WizardSessionView::stored(session),
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /wizard-sessions/{id}
// ---------------------------------------------------------------------------

pub async fn get_session(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let session = load_session(&state, id, auth.as_ref()).await?;
    tracing::debug!(session_id = %id, "Wizard session fetched");
    Ok(Json(DataResponse {
        data: WizardSessionView::stored(session),
    }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/actions
// ---------------------------------------------------------------------------

/// Apply one reducer action.
pub async fn apply_action(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
    Json(action): Json<WizardAction>,
) -> AppResult<impl IntoResponse> {
    let session = load_editable_session(&state, id, auth.as_ref()).await?;
    let action_name = action.name();

    // Reject a bad action before taking the row lock.
    let next = wizard::reduce(session.data.0.clone(), action.clone())?;

    let stored = update_stored(&state, id, |data| {
        *data = wizard::reduce(std::mem::take(data), action)?;
        Ok(())
    })
    .await?;
    let view = match stored {
        Some((row, data)) => WizardSessionView::new(row, data, true),
        None => WizardSessionView::new(session, next, false),
    };

    tracing::info!(
        session_id = %id,
        action = action_name,
        persisted = view.persisted,
        "Wizard action applied"
    );

    Ok(Json(DataResponse { data: view }))
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/advance
// ---------------------------------------------------------------------------

/// Move to the next page. Navigation is range-checked only.
pub async fn advance_step(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    move_step(state, auth, id, 1).await
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/go-back
// ---------------------------------------------------------------------------

/// Move to the previous page.
pub async fn go_back(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    move_step(state, auth, id, -1).await
}

async fn move_step(
    state: AppState,
    auth: Option<AuthUser>,
    id: DbId,
    delta: i32,
) -> AppResult<Json<DataResponse<WizardSessionView>>> {
    let session = load_editable_session(&state, id, auth.as_ref()).await?;

    let current = session.current_step;
    let next = current + delta;
    let (Ok(current_u8), Ok(next_u8)) = (u8::try_from(current), u8::try_from(next)) else {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Cannot move from step {current} to step {next}"
        ))));
    };
    wizard::validate_step_transition(current_u8, next_u8)?;

    let updated = WizardSessionRepo::update_step(&state.pool, id, next)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "WizardSession",
            id,
        }))?;

    tracing::info!(
        session_id = %id,
        from_step = current,
        to_step = next,
        "Wizard step changed"
    );

    Ok(Json(DataResponse {
        data: WizardSessionView::stored(updated),
    }))
}
