//! In-memory storage backend for the Tidepool ledger.
//!
//! Implements every trait from `tidepool-store` over mutex-guarded ordered
//! maps. Iteration order is deterministic (key order), each trait method is
//! one atomic step, and no lock is ever held across an await, which is
//! exactly the single-row atomicity contract the ledger layer builds on.
//! Serves as the reference backend and the test double.

mod account;
mod ballot;
mod block;
mod delegate;
mod membership;
mod meta;
mod transaction;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tidepool_store::{
    Account, Ballot, BlockRecord, Delegate, Store, StoreError, TransactionRecord,
};

/// A thread-safe in-memory store. One mutex per table.
pub struct MemStore {
    accounts: Mutex<BTreeMap<String, Account>>,
    delegates: Mutex<BTreeMap<String, Delegate>>,
    ballots: Mutex<BTreeMap<String, Ballot>>,
    memberships: Mutex<BTreeMap<String, BTreeSet<String>>>,
    /// Keyed by height, the block upsert conflict key.
    blocks: Mutex<BTreeMap<u64, BlockRecord>>,
    transactions: Mutex<BTreeMap<String, TransactionRecord>>,
    meta: Mutex<BTreeMap<String, String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(BTreeMap::new()),
            delegates: Mutex::new(BTreeMap::new()),
            ballots: Mutex::new(BTreeMap::new()),
            memberships: Mutex::new(BTreeMap::new()),
            blocks: Mutex::new(BTreeMap::new()),
            transactions: Mutex::new(BTreeMap::new()),
            meta: Mutex::new(BTreeMap::new()),
        }
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Lock a table, surfacing poison as a backend failure instead of a panic.
pub(crate) fn lock<T>(table: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    table
        .lock()
        .map_err(|_| StoreError::Backend("table mutex poisoned".into()))
}

/// Apply offset/limit paging to an already-ordered row set.
pub(crate) fn page<T>(rows: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    rows.into_iter().skip(offset).take(limit).collect()
}

#[async_trait]
impl Store for MemStore {
    type Accounts = Self;
    type Delegates = Self;
    type Ballots = Self;
    type Memberships = Self;
    type Blocks = Self;
    type Transactions = Self;
    type Meta = Self;

    fn accounts(&self) -> &Self {
        self
    }

    fn delegates(&self) -> &Self {
        self
    }

    fn ballots(&self) -> &Self {
        self
    }

    fn memberships(&self) -> &Self {
        self
    }

    fn blocks(&self) -> &Self {
        self
    }

    fn transactions(&self) -> &Self {
        self
    }

    fn meta(&self) -> &Self {
        self
    }

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(lock(&self.accounts)?.is_empty()
            && lock(&self.delegates)?.is_empty()
            && lock(&self.ballots)?.is_empty()
            && lock(&self.memberships)?.is_empty()
            && lock(&self.blocks)?.is_empty()
            && lock(&self.transactions)?.is_empty()
            && lock(&self.meta)?.is_empty())
    }

    async fn truncate_all(&self) -> Result<(), StoreError> {
        lock(&self.accounts)?.clear();
        lock(&self.delegates)?.clear();
        lock(&self.ballots)?.clear();
        lock(&self.memberships)?.clear();
        lock(&self.blocks)?.clear();
        lock(&self.transactions)?.clear();
        lock(&self.meta)?.clear();
        Ok(())
    }
}
