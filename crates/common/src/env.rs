//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the HTTP listener is bound.

use tracing::warn;

/// Ensure the data directory exists and warn about development defaults
/// that must not reach production.
pub async fn ensure_env(data_dir: &str, jwt_secret: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {data_dir}: {e}"))?;
    if is_dev_secret(jwt_secret) {
        warn!(event = "insecure_jwt_secret", "JWT secret is a development default; set JWT_SECRET or auth.jwt_secret");
    }
    Ok(())
}

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

pub fn is_dev_secret(secret: &str) -> bool {
    secret == DEV_JWT_SECRET || secret.len() < 16
}
