//! Inkpad API server entry point.
//!
//! Loads configuration from the environment, connects to PostgreSQL, runs
//! pending migrations and serves the API until a shutdown signal arrives.
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/inkpad JWT_SECRET=$(openssl rand -hex 32) cargo run
//! ```

use inkpad::{
    app::{build_router, AppState},
    config::Config,
    db,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inkpad=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Inkpad v{} starting", env!("CARGO_PKG_VERSION"));

    db::migrations::ensure_database_exists(&config.database.url).await?;

    let pool = db::pool::create_pool(db::pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    db::migrations::run_migrations(&pool).await?;

    let addr = config.bind_address();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received, exiting");
        })
        .await?;

    Ok(())
}
