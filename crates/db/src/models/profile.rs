//! User profile entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storybook_core::types::{DbId, Timestamp};

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub user_id: DbId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or updating the caller's profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertProfile {
    pub full_name: Option<String>,
}
