//! Repository for the `characters` table.

use sqlx::{PgConnection, PgPool};
use storybook_core::types::DbId;

use crate::models::character::{Character, CreateCharacter};

/// Column list for `characters` queries.
const COLUMNS: &str = "id, storybook_id, name, relation, gender, photo_path, created_at";

/// Provides read access to characters. Inserts happen alongside their
/// storybook in [`crate::repositories::StorybookRepo::create_with_characters`].
pub struct CharacterRepo;

impl CharacterRepo {
    /// List the characters of a storybook in insertion order.
    pub async fn list_by_storybook(
        pool: &PgPool,
        storybook_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM characters \
             WHERE storybook_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(storybook_id)
            .fetch_all(pool)
            .await
    }

    /// Count the characters of a storybook.
    pub async fn count_by_storybook(pool: &PgPool, storybook_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM characters WHERE storybook_id = $1")
                .bind(storybook_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}

/// Insert one character inside an open transaction.
pub(crate) async fn insert(
    conn: &mut PgConnection,
    storybook_id: DbId,
    input: &CreateCharacter,
) -> Result<Character, sqlx::Error> {
    let query = format!(
        "INSERT INTO characters (storybook_id, name, relation, gender, photo_path) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Character>(&query)
        .bind(storybook_id)
        .bind(&input.name)
        .bind(&input.relation)
        .bind(&input.gender)
        .bind(&input.photo_path)
        .fetch_one(conn)
        .await
}
