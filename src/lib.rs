//! minibank - A Primitive Bank Core
//!
//! Monetary accounts for authenticated principals: create, fund, transfer,
//! close. Money is never created, destroyed, or left half-moved, even under
//! concurrent access.
//!
//! # Modules
//!
//! - [`account`] - Core domain types (AccountId, Account, Actor)
//! - [`money`] - Scale-2 fixed-point amount handling
//! - [`store`] - AccountStore abstraction (memory + PostgreSQL backends)
//! - [`ledger`] - Validation pipelines, transfer/funding engines, lifecycle
//! - [`auth`] - Actor resolution, password hashing, JWT issuance
//! - [`gateway`] - HTTP API over the ledger operations
//! - [`config`] - YAML application configuration
//! - [`logging`] - tracing subscriber setup

pub mod account;
pub mod auth;
pub mod config;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod store;

// Convenient re-exports at crate root
pub use account::{Account, AccountId, Actor, ActorId};
pub use ledger::{FundRequest, Ledger, LedgerError, TransferRequest};
pub use store::memory::MemoryStore;
pub use store::postgres::{Database, PgAccountStore};
pub use store::{AccountStore, StoreError, StoreSession};
