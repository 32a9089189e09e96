//! Character entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use storybook_core::checkout::OrderCharacter;
use storybook_core::types::{DbId, Timestamp};

/// A row from the `characters` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub storybook_id: DbId,
    pub name: String,
    pub relation: Option<String>,
    pub gender: Option<String>,
    pub photo_path: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a character; reuses the validated checkout shape.
pub type CreateCharacter = OrderCharacter;
