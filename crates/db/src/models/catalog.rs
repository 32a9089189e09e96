//! Catalog entries shared by the themes/subjects/messages/styles/age_categories tables.

use serde::Serialize;
use sqlx::FromRow;
use storybook_core::types::{DbId, Timestamp};

/// A row from any of the catalog tables (they share one shape).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CatalogEntry {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image_path: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
}
