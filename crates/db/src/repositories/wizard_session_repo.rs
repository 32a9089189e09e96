//! Repository for the `wizard_sessions` table.

use sqlx::types::Json;
use sqlx::PgPool;
use storybook_core::types::DbId;
use storybook_core::wizard::{WizardData, WizardSessionStatus};

use crate::models::wizard_session::WizardSession;

/// Column list for `wizard_sessions` queries.
const COLUMNS: &str = "id, user_id, current_step, data, status, created_at, updated_at";

/// Provides CRUD operations for wizard sessions.
///
/// Every write takes a [`WizardData`] and stores its
/// [`persisted`](WizardData::persisted) copy, so previews can never reach the
/// database through this repository.
pub struct WizardSessionRepo;

impl WizardSessionRepo {
    /// Insert a new, empty wizard session.
    pub async fn create(
        pool: &PgPool,
        user_id: Option<DbId>,
    ) -> Result<WizardSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO wizard_sessions (user_id, data) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WizardSession>(&query)
            .bind(user_id)
            .bind(Json(WizardData::default()))
            .fetch_one(pool)
            .await
    }

    /// Find a wizard session by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WizardSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wizard_sessions WHERE id = $1");
        sqlx::query_as::<_, WizardSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Change the stored data under a row lock.
    ///
    /// The row is read `FOR UPDATE`, `apply` edits the current data and the
    /// sanitized result is written in the same transaction, so concurrent
    /// edits to one session are applied one after another instead of
    /// overwriting each other. An error from `apply` rolls back.
    ///
    /// Returns the stored row and the full data (previews included), or
    /// `None` if the session does not exist.
    pub async fn update_data<F, E>(
        pool: &PgPool,
        id: DbId,
        apply: F,
    ) -> Result<Option<(WizardSession, WizardData)>, E>
    where
        F: FnOnce(&mut WizardData) -> Result<(), E>,
        E: From<sqlx::Error>,
    {
        let mut tx = pool.begin().await?;

        let select = format!("SELECT {COLUMNS} FROM wizard_sessions WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, WizardSession>(&select)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut data = current.data.0;
        apply(&mut data)?;

        let update = format!(
            "UPDATE wizard_sessions SET data = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, WizardSession>(&update)
            .bind(id)
            .bind(Json(data.persisted()))
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some((row, data)))
    }

    /// Update the current step of a session.
    pub async fn update_step(
        pool: &PgPool,
        id: DbId,
        step: i32,
    ) -> Result<Option<WizardSession>, sqlx::Error> {
        let query = format!(
            "UPDATE wizard_sessions SET current_step = $2 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WizardSession>(&query)
            .bind(id)
            .bind(step)
            .fetch_optional(pool)
            .await
    }

    /// Mark a session as submitted and discard its data.
    pub async fn mark_submitted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WizardSession>, sqlx::Error> {
        let query = format!(
            "UPDATE wizard_sessions SET status = $2, data = $3, current_step = 1 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WizardSession>(&query)
            .bind(id)
            .bind(WizardSessionStatus::Submitted.as_str())
            .bind(Json(WizardData::default()))
            .fetch_optional(pool)
            .await
    }
}
