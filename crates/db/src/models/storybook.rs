//! Storybook (order) entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use storybook_core::checkout::OrderDetails;
use storybook_core::types::{DbId, Timestamp};

/// A row from the `storybooks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Storybook {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub child_name: String,
    pub child_gender: Option<String>,
    pub age_category: String,
    pub theme: String,
    pub subject: String,
    pub message: String,
    pub style: String,
    pub custom_note: Option<String>,
    pub child_photo_path: Option<String>,
    pub email: String,
    pub status: String,
    pub pdf_path: Option<String>,
    pub cover_photo_path: Option<String>,
    pub stripe_session_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a storybook.
#[derive(Debug, Clone)]
pub struct CreateStorybook {
    pub user_id: Option<DbId>,
    pub child_name: String,
    pub child_gender: Option<String>,
    pub age_category: String,
    pub theme: String,
    pub subject: String,
    pub message: String,
    pub style: String,
    pub custom_note: Option<String>,
    pub child_photo_path: Option<String>,
    pub email: String,
    pub status: String,
    pub stripe_session_id: Option<String>,
}

impl CreateStorybook {
    /// Build an insert from validated order fields.
    pub fn from_order(
        order: &OrderDetails,
        user_id: Option<DbId>,
        status: &str,
        stripe_session_id: &str,
    ) -> Self {
        Self {
            user_id,
            child_name: order.child_name.clone(),
            child_gender: order.child_gender.clone(),
            age_category: order.age_category.clone(),
            theme: order.theme.clone(),
            subject: order.subject.clone(),
            message: order.message.clone(),
            style: order.style.clone(),
            custom_note: order.custom_note.clone(),
            child_photo_path: Some(order.child_photo_path.clone()).filter(|p| !p.is_empty()),
            email: order.email.clone(),
            status: status.to_string(),
            stripe_session_id: Some(stripe_session_id.to_string()),
        }
    }
}

/// Public projection used by the checkout success page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StorybookStatusView {
    pub id: DbId,
    pub child_name: String,
    pub status: String,
    pub created_at: Timestamp,
}
