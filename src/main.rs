//! minibank - service entry point.
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│ Postgres │───▶│ Ledger core  │───▶│ Gateway  │
//! │  (YAML)  │    │  (sqlx)  │    │ (lock+audit) │    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use minibank::auth::service::UserAuthService;
use minibank::config::AppConfig;
use minibank::gateway::{self, state::AppState};
use minibank::ledger::Ledger;
use minibank::logging::init_logging;
use minibank::store::postgres::{Database, PgAccountStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env);
    let _log_guard = init_logging(&config);

    tracing::info!(env = %env, "minibank starting");

    let postgres_url = config
        .postgres_url
        .clone()
        .context("postgres_url must be set in the config")?;
    let db = Database::connect(&postgres_url).await?;
    db.health_check().await.context("database health check failed")?;

    let store = Arc::new(PgAccountStore::new(db.pool().clone()));
    let ledger = Ledger::new(store)
        .with_lock_timeout(Duration::from_millis(config.ledger.lock_timeout_ms));

    let auth = Arc::new(UserAuthService::new(
        db.pool().clone(),
        config.auth.jwt_secret.clone(),
        config.auth.token_ttl_hours,
    ));

    gateway::serve(&config.gateway, AppState::new(ledger, auth)).await
}
