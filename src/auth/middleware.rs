//! JWT authentication middleware.
//!
//! Resolves the actor exactly once per request and injects it into the
//! request extensions; handlers behind this layer can rely on
//! `Extension<Actor>` being present.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;

use super::{ActorResolver, TokenResolver};
use crate::gateway::state::AppState;
use crate::gateway::types::ApiError;

pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    let resolver = TokenResolver::new(state.auth.clone(), token);
    let actor = resolver.current_actor().await?;

    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}
