//! Repository for the `profiles` table.

use sqlx::PgPool;
use storybook_core::types::DbId;

use crate::models::profile::{Profile, UpsertProfile};

/// Column list for `profiles` queries.
const COLUMNS: &str = "user_id, full_name, email, created_at, updated_at";

pub struct ProfileRepo;

impl ProfileRepo {
    /// Find the profile of a user.
    pub async fn find_by_user(pool: &PgPool, user_id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE user_id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Create the profile on first write, update it afterwards.
    ///
    /// `email` comes from the verified access token, never from the request body.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        email: Option<&str>,
        input: &UpsertProfile,
    ) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (user_id, full_name, email) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE \
                 SET full_name = EXCLUDED.full_name, \
                     email = COALESCE(EXCLUDED.email, profiles.email) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(user_id)
            .bind(&input.full_name)
            .bind(email)
            .fetch_one(pool)
            .await
    }
}
