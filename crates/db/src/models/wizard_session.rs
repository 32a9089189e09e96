//! Wizard session entity model.

use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use storybook_core::types::{DbId, Timestamp};
use storybook_core::wizard::WizardData;

/// A row from the `wizard_sessions` table.
///
/// `data` only ever holds [`WizardData::persisted`] output.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WizardSession {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub current_step: i32,
    pub data: Json<WizardData>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
