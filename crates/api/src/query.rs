use serde::Deserialize;

/// `?limit=&offset=` for the storybook list; clamped by the handler.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
