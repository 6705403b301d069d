//! In-memory implementation of `MetaStore`.

use async_trait::async_trait;
use tidepool_store::{MetaStore, StoreError};

use crate::{lock, MemStore};

#[async_trait]
impl MetaStore for MemStore {
    async fn put_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.meta)?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.meta)?.get(key).cloned())
    }
}
