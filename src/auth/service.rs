//! User registration, login, and JWT issuance over `users_tb`.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use super::AuthError;
use crate::account::{Actor, ActorId};

const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user_id as string)
    pub username: String,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at
}

/// User Registration Request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// User Login Request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Auth Response (JWT)
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
}

/// Hash a password with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Verify a password against a stored hash. A mismatch is
/// `InvalidCredentials`; a malformed stored hash is a `Hash` fault.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Issue a signed token for a user.
pub fn issue_token(
    secret: &str,
    ttl: Duration,
    user_id: i64,
    username: &str,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: (now + ttl).timestamp() as usize,
        iat: now.timestamp() as usize,
    };
    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Decode and validate a token.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, AuthError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);
    let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(token_data.claims)
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: i64,
    username: String,
    password_hash: String,
}

pub struct UserAuthService {
    db: PgPool,
    jwt_secret: String,
    token_ttl: Duration,
}

impl UserAuthService {
    pub fn new(db: PgPool, jwt_secret: String, token_ttl_hours: i64) -> Self {
        Self {
            db,
            jwt_secret,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    /// Register a new user
    pub async fn register(&self, req: RegisterRequest) -> Result<i64, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        let password_hash = hash_password(&req.password)?;

        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users_tb (username, password_hash) VALUES ($1, $2) RETURNING user_id",
        )
        .bind(&req.username)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db)
                if db.code().as_deref() == Some(SQLSTATE_UNIQUE_VIOLATION) =>
            {
                AuthError::UsernameTaken
            }
            _ => AuthError::Database(e),
        })?;

        tracing::info!(user_id, username = %req.username, "user registered");
        Ok(user_id)
    }

    /// Login user and issue JWT
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AuthError> {
        let user = sqlx::query_as::<_, UserRow>(
            "SELECT user_id, username, password_hash FROM users_tb WHERE username = $1",
        )
        .bind(&req.username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

        verify_password(&req.password, &user.password_hash)?;

        let token = issue_token(&self.jwt_secret, self.token_ttl, user.user_id, &user.username)?;
        Ok(AuthResponse {
            token,
            user_id: user.user_id,
            username: user.username,
        })
    }

    /// Decode and validate a bearer token.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        verify_token(&self.jwt_secret, token)
    }

    /// Load the actor for a user id; a missing row means the principal no
    /// longer exists and the call is unauthenticated.
    pub async fn load_actor(&self, user_id: i64) -> Result<Actor, AuthError> {
        let username: Option<String> =
            sqlx::query_scalar("SELECT username FROM users_tb WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.db)
                .await?;
        match username {
            Some(username) => Ok(Actor::new(ActorId::new(user_id), username)),
            None => Err(AuthError::Unauthenticated),
        }
    }
}
