use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use server::config::AppConfig;
use server::database::init_db;
use server::schema::ensure_constraints;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url)
        .await
        .context("Failed to connect to the database")?;
    ensure_constraints(&db)
        .await
        .context("Failed to create schema constraints")?;
    info!("Database ready");

    let media = common::media::build_host(&config.media)
        .await
        .context("Failed to initialise the media host")?;

    let addr = config.bind_addr();
    let state = AppState { db, config, media };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
