//! Generated story page images.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use storybook_core::types::{DbId, Timestamp};

/// A row from the `story_images` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryImage {
    pub id: DbId,
    pub storybook_id: DbId,
    pub image_path: String,
    pub page_number: i32,
    pub created_at: Timestamp,
}

/// DTO for one generated page.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStoryImage {
    pub image_path: String,
    pub page_number: i32,
}
