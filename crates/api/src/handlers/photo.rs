//! Photo upload for the child and character slots of a wizard session.
//!
//! The slot moves through three persisted states: cleared on any failure,
//! `uploading` while the bytes are written, and finally the stored object
//! path. Each state change edits only the targeted slot of the locked row, so
//! actions applied while the bytes are being stored are kept. Previews only
//! ever appear in responses.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use storybook_core::error::CoreError;
use storybook_core::types::DbId;
use storybook_core::upload;
use storybook_core::wizard::{PhotoSlot, PhotoTarget, WizardData};
use storybook_db::models::wizard_session::WizardSession;

use crate::error::{AppError, AppResult};
use crate::handlers::wizard::{load_editable_session, update_stored, WizardSessionView};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Content type assumed when the part does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

struct PhotoFile {
    content_type: String,
    bytes: Vec<u8>,
}

/// A body over the request limit surfaces here, while the parts are read.
fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Core(CoreError::Validation(
            "Photo is too large. The limit is 5 MB".to_string(),
        ))
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// Read the `file` part. `character_id` is filled in as soon as its part is
/// read, so the caller knows the target even when a later part fails.
async fn read_form(
    mut multipart: Multipart,
    character_id: &mut Option<DbId>,
) -> AppResult<PhotoFile> {
    let mut file: Option<PhotoFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some(PhotoFile {
                    content_type,
                    bytes: data.to_vec(),
                });
            }
            "character_id" => {
                let text = field.text().await.map_err(multipart_error)?;
                let text = text.trim();
                if !text.is_empty() {
                    *character_id = Some(text.parse().map_err(|_| {
                        AppError::BadRequest(format!("'{text}' is not a valid character id"))
                    })?);
                }
            }
            _ => {}
        }
    }

    file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))
}

/// Apply `change` to the targeted slot of the stored session.
///
/// `None` when the write failed; the failure is already logged.
async fn update_slot<F>(
    state: &AppState,
    id: DbId,
    target: PhotoTarget,
    change: F,
) -> AppResult<Option<(WizardSession, WizardData)>>
where
    F: FnOnce(&mut PhotoSlot),
{
    update_stored(state, id, |data| {
        change(data.photo_slot_mut(target)?);
        Ok(())
    })
    .await
}

/// Clear the targeted slot after a failed upload. Never masks the original
/// error.
async fn clear_slot(state: &AppState, id: DbId, target: PhotoTarget) {
    if let Err(e) = update_slot(state, id, target, PhotoSlot::clear).await {
        tracing::warn!(session_id = %id, error = %e, "Could not clear photo slot");
    }
}

// ---------------------------------------------------------------------------
// POST /wizard-sessions/{id}/photo
// ---------------------------------------------------------------------------

/// Upload the child photo, or a character photo when `character_id` is given.
pub async fn upload_photo(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Json<DataResponse<WizardSessionView>>> {
    let session = load_editable_session(&state, id, auth.as_ref()).await?;

    let mut character_id = None;
    let form = read_form(multipart, &mut character_id).await;
    let target = character_id.map_or(PhotoTarget::Child, PhotoTarget::Character);

    // Unknown character: 404 before anything is touched.
    let mut data = session.data.0.clone();
    data.photo_slot_mut(target)?;

    let form = match form {
        Ok(form) => form,
        Err(e) => {
            tracing::info!(session_id = %id, reason = %e, "Photo form unreadable");
            clear_slot(&state, id, target).await;
            return Err(e);
        }
    };

    let ext = match upload::validate_photo(&form.content_type, form.bytes.len()) {
        Ok(ext) => ext,
        Err(e) => {
            tracing::info!(
                session_id = %id,
                content_type = %form.content_type,
                size = form.bytes.len(),
                reason = %e,
                "Photo rejected"
            );
            clear_slot(&state, id, target).await;
            return Err(e.into());
        }
    };

    let preview = upload::preview_data_url(&form.content_type, &form.bytes);
    update_slot(&state, id, target, |slot| slot.uploading = true).await?;

    let path = upload::photo_object_path(target, id, ext);
    if let Err(e) = state.storage.put(&path, &form.bytes, &form.content_type).await {
        tracing::error!(session_id = %id, path = %path, error = %e, "Photo upload failed");
        clear_slot(&state, id, target).await;
        return Err(e.into());
    }

    let finish = |slot: &mut PhotoSlot| {
        slot.path = Some(path.clone());
        slot.preview = Some(preview.clone());
        slot.uploading = false;
    };
    let view = match update_slot(&state, id, target, finish).await? {
        Some((row, data)) => WizardSessionView::new(row, data, true),
        None => {
            finish(data.photo_slot_mut(target)?);
            WizardSessionView::new(session, data, false)
        }
    };

    tracing::info!(
        session_id = %id,
        path = %path,
        persisted = view.persisted,
        "Photo uploaded"
    );

    Ok(Json(DataResponse { data: view }))
}
