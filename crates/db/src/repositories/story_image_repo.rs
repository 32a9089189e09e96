//! Repository for the `story_images` table.

use sqlx::{PgConnection, PgPool};
use storybook_core::types::DbId;

use crate::models::story_image::{CreateStoryImage, StoryImage};

/// Column list for `story_images` queries.
const COLUMNS: &str = "id, storybook_id, image_path, page_number, created_at";

pub struct StoryImageRepo;

impl StoryImageRepo {
    /// List the pages of a storybook ordered by page number.
    pub async fn list_by_storybook(
        pool: &PgPool,
        storybook_id: DbId,
    ) -> Result<Vec<StoryImage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM story_images \
             WHERE storybook_id = $1 \
             ORDER BY page_number"
        );
        sqlx::query_as::<_, StoryImage>(&query)
            .bind(storybook_id)
            .fetch_all(pool)
            .await
    }

    /// Replace all pages of a storybook in one transaction.
    pub async fn replace_for_storybook(
        pool: &PgPool,
        storybook_id: DbId,
        images: &[CreateStoryImage],
    ) -> Result<Vec<StoryImage>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = replace(&mut *tx, storybook_id, images).await?;
        tx.commit().await?;
        Ok(created)
    }
}

/// Delete the pages of a storybook and insert `images` on the caller's
/// connection.
pub(crate) async fn replace(
    conn: &mut PgConnection,
    storybook_id: DbId,
    images: &[CreateStoryImage],
) -> Result<Vec<StoryImage>, sqlx::Error> {
    sqlx::query("DELETE FROM story_images WHERE storybook_id = $1")
        .bind(storybook_id)
        .execute(&mut *conn)
        .await?;

    let query = format!(
        "INSERT INTO story_images (storybook_id, image_path, page_number) \
         VALUES ($1, $2, $3) \
         RETURNING {COLUMNS}"
    );
    let mut created = Vec::with_capacity(images.len());
    for image in images {
        let row = sqlx::query_as::<_, StoryImage>(&query)
            .bind(storybook_id)
            .bind(&image.image_path)
            .bind(image.page_number)
            .fetch_one(&mut *conn)
            .await?;
        created.push(row);
    }
    Ok(created)
}
