//! HTTP handlers mapping wire requests onto the ledger operations.
//!
//! The JWT middleware has already resolved the [`Actor`] for everything
//! under `/api/v1/accounts`; handlers just thread it into the core and wrap
//! the outcome in the response envelope.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Serialize;

use super::state::AppState;
use super::types::{ApiResult, ok};
use crate::account::{Account, AccountId, Actor};
use crate::auth::service::{AuthResponse, LoginRequest, RegisterRequest};
use crate::ledger::{FundRequest, TransferRequest};
use crate::money;

#[derive(Debug, Serialize)]
pub struct RegisteredData {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct AccountIdData {
    pub account_id: AccountId,
}

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub account_id: AccountId,
    pub balance: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id(),
            balance: money::format_amount(account.balance()),
        }
    }
}

/// GET /health
pub async fn health() -> ApiResult<&'static str> {
    ok("ok")
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<RegisteredData> {
    let user_id = state.auth.register(req).await?;
    ok(RegisteredData { user_id })
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let resp = state.auth.login(req).await?;
    ok(resp)
}

/// POST /api/v1/accounts/new
pub async fn create_account(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<AccountIdData> {
    let account_id = state.ledger.create_account(&actor).await?;
    ok(AccountIdData { account_id })
}

/// POST /api/v1/accounts/fund
pub async fn fund(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<FundRequest>,
) -> ApiResult<AccountIdData> {
    let account_id = state.ledger.fund(&actor, req).await?;
    ok(AccountIdData { account_id })
}

/// POST /api/v1/accounts/transfer
pub async fn transfer(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<TransferRequest>,
) -> ApiResult<()> {
    state.ledger.transfer(&actor, req).await?;
    ok(())
}

/// DELETE /api/v1/accounts/{id}
pub async fn close_account(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    state.ledger.close_account(&actor, AccountId::new(id)).await?;
    ok(())
}

/// GET /api/v1/accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> ApiResult<Vec<AccountView>> {
    let accounts = state.ledger.accounts_of(&actor).await?;
    ok(accounts.iter().map(AccountView::from).collect())
}
