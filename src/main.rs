use std::sync::Arc;

use anyhow::{Context, Result};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use greenpulse_backend::{
    auth::jwt::JwtService, config::AppConfig, db, routes::create_router, state::AppState,
    uploads::FileStore,
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        database_url = %config.redacted_database_url(),
        pool_size = config.database_max_pool_size,
        upload_dir = %config.upload_dir.display(),
        "loaded backend configuration"
    );

    let pool = db::init_pool(&config.database_url, config.database_max_pool_size)?;

    {
        let mut conn = pool.get().context("failed to get database connection")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow::anyhow!("failed to run migrations: {err}"))?;
    }

    let files = Arc::new(FileStore::new(config.upload_dir.clone()));
    let jwt = JwtService::from_config(&config)?;

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let state = AppState::new(pool, config, files, jwt);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
