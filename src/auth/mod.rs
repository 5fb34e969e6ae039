//! Actor resolution and user authentication.
//!
//! The ledger core never reaches for ambient "current user" context: the
//! calling layer resolves the [`Actor`] once per operation through
//! [`ActorResolver`] and passes it down explicitly. The JWT-backed
//! [`TokenResolver`] is the production implementation; [`StaticResolver`]
//! serves tests and embedded use.

pub mod middleware;
pub mod service;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::account::Actor;
use service::UserAuthService;

/// Authentication and actor-resolution errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// No valid principal is attached to the call.
    #[error("no authenticated principal attached to the call")]
    Unauthenticated,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("invalid registration: {0}")]
    Validation(String),

    #[error("password hash error: {0}")]
    Hash(String),

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Supplies the authenticated principal for the current operation.
#[async_trait]
pub trait ActorResolver: Send + Sync {
    /// The actor this call runs on behalf of; `Unauthenticated` when no
    /// valid principal is attached.
    async fn current_actor(&self) -> Result<Actor, AuthError>;
}

/// Resolves the actor from a bearer token against the user table.
pub struct TokenResolver {
    service: Arc<UserAuthService>,
    token: Option<String>,
}

impl TokenResolver {
    pub fn new(service: Arc<UserAuthService>, token: Option<String>) -> Self {
        Self { service, token }
    }
}

#[async_trait]
impl ActorResolver for TokenResolver {
    async fn current_actor(&self) -> Result<Actor, AuthError> {
        let token = self.token.as_deref().ok_or(AuthError::Unauthenticated)?;
        let claims = self.service.verify(token)?;
        let user_id: i64 = claims.sub.parse().map_err(|_| AuthError::Unauthenticated)?;
        // The token may outlive the user row; the lookup is authoritative.
        self.service.load_actor(user_id).await
    }
}

/// Fixed-actor resolver for tests and embedded callers.
pub struct StaticResolver {
    actor: Option<Actor>,
}

impl StaticResolver {
    pub fn authenticated(actor: Actor) -> Self {
        Self { actor: Some(actor) }
    }

    pub fn anonymous() -> Self {
        Self { actor: None }
    }
}

#[async_trait]
impl ActorResolver for StaticResolver {
    async fn current_actor(&self) -> Result<Actor, AuthError> {
        self.actor.clone().ok_or(AuthError::Unauthenticated)
    }
}
