//! Gateway response envelope and error mapping.
//!
//! Every endpoint answers `{ code, msg, data }`; structured core failures
//! are mapped onto HTTP statuses plus a stable numeric code so clients can
//! branch without parsing messages.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::auth::AuthError;
use crate::ledger::LedgerError;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// 0 for success, non-zero for errors
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Success shorthand for handlers.
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// Error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const FORBIDDEN_OPERATION: i32 = 1002;
    pub const USERNAME_TAKEN: i32 = 1004;

    // Auth errors (2xxx)
    pub const MISSING_AUTH: i32 = 2001;
    pub const AUTH_FAILED: i32 = 2002;

    // Resource errors (4xxx)
    pub const ACCOUNT_NOT_FOUND: i32 = 4001;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_BUSY: i32 = 5003;
}

/// A failed endpoint call: HTTP status, numeric code, human message.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn unauthorized(code: i32, msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiResponse::<()>::error(self.code, self.msg));
        (self.status, body).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::BadRequest(msg) => ApiError::bad_request(msg),
            LedgerError::UncertainAccount(msg) => ApiError::new(
                StatusCode::NOT_FOUND,
                error_codes::ACCOUNT_NOT_FOUND,
                msg,
            ),
            LedgerError::ForbiddenOperation(msg) => ApiError::new(
                StatusCode::FORBIDDEN,
                error_codes::FORBIDDEN_OPERATION,
                msg,
            ),
            LedgerError::LockTimeout => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                error_codes::SERVICE_BUSY,
                "account is busy, retry the operation",
            ),
            LedgerError::NotFound(msg) => ApiError::new(
                StatusCode::NOT_FOUND,
                error_codes::ACCOUNT_NOT_FOUND,
                msg,
            ),
            LedgerError::Store(e) => {
                tracing::error!(error = %e, "storage failure surfaced to gateway");
                ApiError::internal("internal storage error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated => {
                ApiError::unauthorized(error_codes::MISSING_AUTH, err.to_string())
            }
            AuthError::InvalidCredentials | AuthError::Token(_) => {
                ApiError::unauthorized(error_codes::AUTH_FAILED, "invalid credentials or token")
            }
            AuthError::UsernameTaken => ApiError::new(
                StatusCode::CONFLICT,
                error_codes::USERNAME_TAKEN,
                err.to_string(),
            ),
            AuthError::Validation(msg) => ApiError::bad_request(msg),
            AuthError::Hash(_) | AuthError::Database(_) => {
                tracing::error!(error = %err, "auth backend failure");
                ApiError::internal("internal auth error")
            }
        }
    }
}
