//! In-process account store.
//!
//! Rows live in a single `RwLock<HashMap>`; exclusive row holds are per-row
//! `tokio::sync::Mutex`es acquired with a bounded wait. A session stages its
//! writes and applies them in one shot under the table write lock at commit,
//! so a plain `get` can never observe a half-applied transfer.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{AccountStore, StoreError, StoreSession};
use crate::account::{Account, AccountId, ActorId};

type RowMap = Arc<RwLock<HashMap<AccountId, Account>>>;
type LockMap = Arc<DashMap<AccountId, Arc<Mutex<()>>>>;

/// Memory-backed [`AccountStore`].
#[derive(Clone)]
pub struct MemoryStore {
    rows: RowMap,
    locks: LockMap,
    next_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            locks: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    fn read_row(&self, id: AccountId) -> Option<Account> {
        self.rows
            .read()
            .expect("account table lock poisoned")
            .get(&id)
            .cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.read_row(id))
    }

    async fn exists(&self, id: AccountId) -> Result<bool, StoreError> {
        Ok(self.read_row(id).is_some())
    }

    async fn find_by_owner(&self, owner: ActorId) -> Result<Vec<Account>, StoreError> {
        let rows = self.rows.read().expect("account table lock poisoned");
        let mut owned: Vec<Account> = rows
            .values()
            .filter(|a| a.owner() == owner)
            .cloned()
            .collect();
        owned.sort_by_key(|a| a.id());
        Ok(owned)
    }

    async fn create(&self, owner: ActorId) -> Result<Account, StoreError> {
        let id = AccountId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let account = Account::open(id, owner);
        self.rows
            .write()
            .expect("account table lock poisoned")
            .insert(id, account.clone());
        Ok(account)
    }

    async fn begin(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(MemorySession {
            rows: Arc::clone(&self.rows),
            locks: Arc::clone(&self.locks),
            guards: HashMap::new(),
            staged: HashMap::new(),
        }))
    }
}

/// One transaction against a [`MemoryStore`].
///
/// `staged` maps an id to `Some(row)` for a save and `None` for a delete;
/// last write per id wins. Guards are held until the session is consumed,
/// which releases them on commit and rollback alike (and on drop, which is
/// the implicit rollback).
struct MemorySession {
    rows: RowMap,
    locks: LockMap,
    guards: HashMap<AccountId, OwnedMutexGuard<()>>,
    staged: HashMap<AccountId, Option<Account>>,
}

impl MemorySession {
    fn current(&self, id: AccountId) -> Option<Account> {
        if let Some(staged) = self.staged.get(&id) {
            return staged.clone();
        }
        self.rows
            .read()
            .expect("account table lock poisoned")
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn locked_get(
        &mut self,
        id: AccountId,
        timeout: Duration,
    ) -> Result<Option<Account>, StoreError> {
        if !self.guards.contains_key(&id) {
            // Clone the Arc out before awaiting; holding a DashMap entry
            // across an await point can wedge the shard.
            let lock = {
                let entry = self.locks.entry(id).or_default();
                Arc::clone(entry.value())
            };
            match tokio::time::timeout(timeout, lock.lock_owned()).await {
                Ok(guard) => {
                    self.guards.insert(id, guard);
                }
                Err(_) => return Err(StoreError::LockTimeout(id, timeout)),
            }
        }
        Ok(self.current(id))
    }

    async fn save(&mut self, account: &Account) -> Result<(), StoreError> {
        let id = account.id();
        if !self.guards.contains_key(&id) {
            return Err(StoreError::LockNotHeld(id));
        }
        if account.balance() < Decimal::ZERO {
            return Err(StoreError::NegativeBalance(id));
        }
        self.staged.insert(id, Some(account.clone()));
        Ok(())
    }

    async fn delete(&mut self, id: AccountId) -> Result<(), StoreError> {
        if !self.guards.contains_key(&id) {
            return Err(StoreError::LockNotHeld(id));
        }
        self.staged.insert(id, None);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut rows = self.rows.write().expect("account table lock poisoned");
        for (id, staged) in &self.staged {
            match staged {
                Some(account) => {
                    rows.insert(*id, account.clone());
                }
                None => {
                    rows.remove(id);
                }
            }
        }
        // Guards drop with the session, releasing the row locks.
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
