use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use layouts_api::app_state::AppState;
use layouts_api::config::Config;
use layouts_api::database;
use layouts_api::database::memory::InMemoryLayoutStore;
use layouts_api::database::postgres::PgLayoutStore;
use layouts_api::database::store::LayoutStore;
use layouts_api::router::build_router;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "layouts_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;
    info!(
        "Loaded configuration for environment: {}",
        config.environment
    );

    let store: Arc<dyn LayoutStore> = if config.test_mode {
        info!("TEST_MODE enabled, using in-memory layout store");
        Arc::new(InMemoryLayoutStore::new())
    } else {
        let database_url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required unless TEST_MODE is set"))?;

        let db_pool = database::setup_database(database_url, config.max_connections).await?;
        database::run_migrations(&db_pool).await?;
        Arc::new(PgLayoutStore::new(db_pool))
    };

    let app_state = AppState::new(store, config.clone());
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting layouts API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM or SIGINT signal for graceful shutdown
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
