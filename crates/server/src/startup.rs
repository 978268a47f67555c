use std::net::SocketAddr;

use axum::Router;
use dotenvy::dotenv;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes::{self, auth};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// config.toml when present, otherwise environment variables only
fn load_config() -> Result<configs::AppConfig, StartupError> {
    configs::AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

fn bind_addr(cfg: &configs::AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bad bind address {raw}: {e}")))
}

async fn connect_and_migrate(cfg: &configs::AppConfig) -> Result<DatabaseConnection, StartupError> {
    let db_cfg = models::db::DatabaseConfig::from(&cfg.database);
    let db = models::db::connect_with_config(&db_cfg)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    migration::Migrator::up(&db, None)
        .await
        .map_err(|e| StartupError::Migration(e.to_string()))?;
    info!(event = "migrations_applied", "database schema is up to date");
    Ok(db)
}

/// Application state and router for an already connected database
pub fn build_app(db: DatabaseConnection, auth_cfg: &configs::AuthConfig) -> Router {
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig {
            jwt_secret: auth_cfg.jwt_secret.clone(),
            token_ttl_hours: auth_cfg.token_ttl_hours,
        },
    };
    routes::build_router(state, build_cors())
}

/// Public entry: load configuration, prepare the database and run the HTTP server
/// until `shutdown` resolves.
pub async fn run_until<F>(shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    dotenv().ok();
    let cfg = load_config()?;
    common::env::ensure_env(&cfg.server.data_dir, &cfg.auth.jwt_secret).await?;

    let db = connect_and_migrate(&cfg).await?;
    let app = build_app(db, &cfg.auth);

    let addr = bind_addr(&cfg)?;
    info!(%addr, event = "listening", "starting bizfin api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!(event = "server_stopped", "http server drained");
    Ok(())
}

/// Run until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    run_until(async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}
