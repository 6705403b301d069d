//! Opaque key-value checkpoint storage.

use crate::StoreError;
use async_trait::async_trait;

/// Consumer checkpoint metadata, e.g. the last processed height.
///
/// Values are opaque strings with no relational invariants; this table
/// never participates in ledger bookkeeping.
#[async_trait]
pub trait MetaStore: Send + Sync {
    /// Insert or overwrite the value stored under `key`.
    async fn put_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// The value stored under `key`, `None` if never saved.
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
}
