//! Shared gateway state.

use std::sync::Arc;

use crate::auth::service::UserAuthService;
use crate::ledger::Ledger;
use crate::store::postgres::PgAccountStore;

#[derive(Clone)]
pub struct AppState {
    /// The ledger core over the PostgreSQL account store.
    pub ledger: Ledger<PgAccountStore>,
    /// User registration, login, and token verification.
    pub auth: Arc<UserAuthService>,
}

impl AppState {
    pub fn new(ledger: Ledger<PgAccountStore>, auth: Arc<UserAuthService>) -> Self {
        Self { ledger, auth }
    }
}
