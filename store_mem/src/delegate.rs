//! In-memory implementation of `DelegateStore`.

use async_trait::async_trait;
use tidepool_store::{Delegate, DelegateStore, SortOrder, StoreError};
use tidepool_types::WalletAddress;

use crate::{lock, page, MemStore};

#[async_trait]
impl DelegateStore for MemStore {
    async fn upsert_delegate(&self, delegate: &Delegate) -> Result<(), StoreError> {
        lock(&self.delegates)?.insert(delegate.address.as_str().to_owned(), delegate.clone());
        Ok(())
    }

    async fn get_delegate(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<Delegate>, StoreError> {
        Ok(lock(&self.delegates)?.get(address.as_str()).cloned())
    }

    async fn delegate_exists(&self, address: &WalletAddress) -> Result<bool, StoreError> {
        Ok(lock(&self.delegates)?.contains_key(address.as_str()))
    }

    async fn delegates_by_vote_weight(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Delegate>, StoreError> {
        // Map order is address-ascending; the stable sort keeps that as the
        // tie-break, so rankings reproduce across peers.
        let mut rows: Vec<Delegate> = lock(&self.delegates)?.values().cloned().collect();
        match order {
            SortOrder::Asc => rows.sort_by(|a, b| a.vote_weight.cmp(&b.vote_weight)),
            SortOrder::Desc => rows.sort_by(|a, b| b.vote_weight.cmp(&a.vote_weight)),
        }
        Ok(page(rows, offset, limit))
    }
}
