//! Repository for the `storybooks` table.

use sqlx::{PgConnection, PgPool};
use storybook_core::storybook::StorybookStatus;
use storybook_core::types::DbId;

use crate::models::character::{Character, CreateCharacter};
use crate::models::story_image::CreateStoryImage;
use crate::models::storybook::{CreateStorybook, Storybook, StorybookStatusView};
use crate::repositories::{character_repo, story_image_repo};

/// Column list for `storybooks` queries.
const COLUMNS: &str = "id, user_id, child_name, child_gender, age_category, theme, subject, \
     message, style, custom_note, child_photo_path, email, status, pdf_path, \
     cover_photo_path, stripe_session_id, created_at, updated_at";

/// Insert column list, bound as `$1..$13` in this order.
const INSERT_COLUMNS: &str = "user_id, child_name, child_gender, age_category, theme, subject, \
     message, style, custom_note, child_photo_path, email, status, stripe_session_id";

const INSERT_VALUES: &str = "$1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13";

/// Provides CRUD operations for storybooks.
pub struct StorybookRepo;

impl StorybookRepo {
    /// Insert a storybook and its characters in one transaction.
    pub async fn create_with_characters(
        pool: &PgPool,
        input: &CreateStorybook,
        characters: &[CreateCharacter],
    ) -> Result<(Storybook, Vec<Character>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let storybook = Self::insert(&mut *tx, input).await?;

        let mut created = Vec::with_capacity(characters.len());
        for character in characters {
            created.push(character_repo::insert(&mut *tx, storybook.id, character).await?);
        }

        tx.commit().await?;
        Ok((storybook, created))
    }

    /// Insert a storybook for a checkout session unless one already exists.
    ///
    /// Returns `None` when a row with the same `stripe_session_id` is already
    /// present; no duplicate is ever created.
    pub async fn insert_for_session_if_absent(
        pool: &PgPool,
        input: &CreateStorybook,
    ) -> Result<Option<Storybook>, sqlx::Error> {
        let query = format!(
            "INSERT INTO storybooks ({INSERT_COLUMNS}) \
             VALUES ({INSERT_VALUES}) \
             ON CONFLICT ON CONSTRAINT uq_storybooks_stripe_session_id DO NOTHING \
             RETURNING {COLUMNS}"
        );
        bind_insert(sqlx::query_as::<_, Storybook>(&query), input)
            .fetch_optional(pool)
            .await
    }

    async fn insert(
        conn: &mut PgConnection,
        input: &CreateStorybook,
    ) -> Result<Storybook, sqlx::Error> {
        let query = format!(
            "INSERT INTO storybooks ({INSERT_COLUMNS}) \
             VALUES ({INSERT_VALUES}) \
             RETURNING {COLUMNS}"
        );
        bind_insert(sqlx::query_as::<_, Storybook>(&query), input)
            .fetch_one(conn)
            .await
    }

    /// Find a storybook by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Storybook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM storybooks WHERE id = $1");
        sqlx::query_as::<_, Storybook>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a storybook owned by `user_id`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Storybook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM storybooks WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Storybook>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the storybook created for a Stripe checkout session.
    pub async fn find_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<Storybook>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM storybooks WHERE stripe_session_id = $1");
        sqlx::query_as::<_, Storybook>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Public status projection for a checkout session.
    pub async fn find_status_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<StorybookStatusView>, sqlx::Error> {
        sqlx::query_as::<_, StorybookStatusView>(
            "SELECT id, child_name, status, created_at FROM storybooks \
             WHERE stripe_session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await
    }

    /// List a user's storybooks, most recent first.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Storybook>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM storybooks \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Storybook>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count a user's storybooks.
    pub async fn count_by_user(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storybooks WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Mark an unpaid storybook as paid.
    ///
    /// Returns `None` if the row was already past the unpaid statuses, so a
    /// concurrent redelivery of the same event changes nothing.
    pub async fn mark_payment_received(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Storybook>, sqlx::Error> {
        let query = format!(
            "UPDATE storybooks SET status = $2 \
             WHERE id = $1 AND status IN ('draft', 'pending_payment') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Storybook>(&query)
            .bind(id)
            .bind(StorybookStatus::PaymentReceived.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Assign an unowned storybook to a user.
    ///
    /// The `user_id IS NULL` guard makes the claim atomic: of two concurrent
    /// claims exactly one gets the row back. Only a `payment_received` row
    /// moves to `claimed_by_user`; unpaid and generated rows keep their
    /// status so the payment webhook and generation results still apply.
    pub async fn claim(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Storybook>, sqlx::Error> {
        let query = format!(
            "UPDATE storybooks SET user_id = $2, \
                 status = CASE WHEN status = $3 THEN $4 ELSE status END \
             WHERE id = $1 AND user_id IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Storybook>(&query)
            .bind(id)
            .bind(user_id)
            .bind(StorybookStatus::PaymentReceived.as_str())
            .bind(StorybookStatus::ClaimedByUser.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Record the outcome of story generation.
    ///
    /// Non-empty `images` replace the stored pages in the same transaction,
    /// so a failed page write leaves the status and paths untouched.
    pub async fn record_generation_result(
        pool: &PgPool,
        id: DbId,
        status: StorybookStatus,
        pdf_path: Option<&str>,
        cover_photo_path: Option<&str>,
        images: &[CreateStoryImage],
    ) -> Result<Option<Storybook>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE storybooks SET status = $2, \
                 pdf_path = COALESCE($3, pdf_path), \
                 cover_photo_path = COALESCE($4, cover_photo_path) \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let Some(storybook) = sqlx::query_as::<_, Storybook>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(pdf_path)
            .bind(cover_photo_path)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if !images.is_empty() {
            story_image_repo::replace(&mut *tx, id, images).await?;
        }

        tx.commit().await?;
        Ok(Some(storybook))
    }
}

type StorybookQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, Storybook, sqlx::postgres::PgArguments>;

fn bind_insert<'q>(query: StorybookQuery<'q>, input: &'q CreateStorybook) -> StorybookQuery<'q> {
    query
        .bind(input.user_id)
        .bind(&input.child_name)
        .bind(&input.child_gender)
        .bind(&input.age_category)
        .bind(&input.theme)
        .bind(&input.subject)
        .bind(&input.message)
        .bind(&input.style)
        .bind(&input.custom_note)
        .bind(&input.child_photo_path)
        .bind(&input.email)
        .bind(&input.status)
        .bind(&input.stripe_session_id)
}
