//! HTTP gateway.
//!
//! Thin wire layer over the ledger core: routing, the response envelope,
//! and JWT-gated account routes. Everything interesting happens below it.

pub mod handlers;
pub mod state;
pub mod types;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post};
use tokio::net::TcpListener;

use crate::auth::middleware::jwt_auth_middleware;
use crate::config::GatewayConfig;
use state::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login));

    let account_routes = Router::new()
        .route("/new", post(handlers::create_account))
        .route("/fund", post(handlers::fund))
        .route("/transfer", post(handlers::transfer))
        .route("/{id}", delete(handlers::close_account))
        .route("/", get(handlers::list_accounts))
        .layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1/auth", auth_routes)
        .nest("/api/v1/accounts", account_routes)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(%addr, "gateway listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
