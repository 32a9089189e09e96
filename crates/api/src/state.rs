use std::sync::Arc;

use storybook_integrations::{ObjectStore, OrderForwarder, PaymentGateway};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: storybook_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Creates hosted checkout sessions.
    pub payments: Arc<dyn PaymentGateway>,
    /// Hands paid orders to the story-generation automation.
    pub forwarder: Arc<dyn OrderForwarder>,
    /// Bucket for uploaded photos.
    pub storage: Arc<dyn ObjectStore>,
}
