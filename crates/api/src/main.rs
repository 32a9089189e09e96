use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storybook_api::config::ServerConfig;
use storybook_api::router::build_app_router;
use storybook_api::state::AppState;
use storybook_core::upload::IMAGES_BUCKET;
use storybook_integrations::{HttpForwarder, LocalObjectStore, StripeGateway};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storybook_api=debug,storybook_integrations=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = storybook_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    storybook_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    storybook_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- Integrations ---
    let payments = StripeGateway::new(
        config.stripe.secret_key.clone(),
        config.stripe.price_id.clone(),
        config.stripe.success_url.clone(),
        config.stripe.cancel_url.clone(),
    )
    .expect("Failed to build Stripe client");

    let forwarder = HttpForwarder::new(
        config.automation.webhook_url.clone(),
        config.automation.secret.clone(),
    )
    .expect("Failed to build automation client");

    let storage = LocalObjectStore::new(
        &config.storage.root,
        IMAGES_BUCKET,
        config.storage.public_base_url.clone(),
    );
    tracing::info!(root = %config.storage.root, "Photo storage ready");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        payments: Arc::new(payments),
        forwarder: Arc::new(forwarder),
        storage: Arc::new(storage),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
