//! Repository for the catalog tables (themes, subjects, messages, styles,
//! age categories).

use sqlx::PgPool;
use storybook_core::catalog::CatalogKind;

use crate::models::catalog::CatalogEntry;

/// Column list shared by every catalog table.
const COLUMNS: &str = "id, name, description, image_path, sort_order, is_active, created_at";

pub struct CatalogRepo;

impl CatalogRepo {
    /// List active entries of one catalog in display order.
    pub async fn list_active(
        pool: &PgPool,
        kind: CatalogKind,
    ) -> Result<Vec<CatalogEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {table} \
             WHERE is_active = TRUE \
             ORDER BY sort_order, name",
            table = kind.table()
        );
        sqlx::query_as::<_, CatalogEntry>(&query)
            .fetch_all(pool)
            .await
    }
}
