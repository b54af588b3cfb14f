// Initialize configuration
// Set up logging
// Create database connection pool
// Wire caches and services into shared state
// Start HTTP server with graceful shutdown

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wedding_invitation_service::{api, config::Config, db, state::AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting wedding-invitation-service");

    let config = Config::from_env();
    if config.uses_default_secrets() {
        tracing::warn!("JWT_SECRET or ADMIN_API_KEY is unset, using insecure defaults");
    }

    let db_pool = db::connection::establish_connection(&config.database_url).await?;
    tracing::info!("Database connection established: {}", config.database_url);

    let app_state = Arc::new(AppState::new(config.clone(), db_pool.clone()));
    tracing::info!(
        "Caches initialized (guest TTL {:?}, comment TTL {:?}, sweep every {:?})",
        config.guest_cache_ttl,
        config.comment_cache_ttl,
        config.cache_sweep_interval
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
        }
        signal_token.cancel();
    });

    let app = api::create_router(app_state);
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    db_pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}
