//! Delegate row and storage trait.

use crate::{SortOrder, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_types::{TokenAmount, WalletAddress};

/// One delegate row, keyed by wallet address.
///
/// `vote_weight` is maintained incrementally by the caller that applies
/// ballots; it is never recomputed from ballot history on read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delegate {
    pub address: WalletAddress,
    pub vote_weight: TokenAmount,
}

/// Storage operations for delegate rows.
#[async_trait]
pub trait DelegateStore: Send + Sync {
    /// Insert or fully replace the row keyed by `delegate.address`.
    async fn upsert_delegate(&self, delegate: &Delegate) -> Result<(), StoreError>;

    async fn get_delegate(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<Delegate>, StoreError>;

    async fn delegate_exists(&self, address: &WalletAddress) -> Result<bool, StoreError>;

    /// Page through delegates ordered by vote weight in `order`, with
    /// address ascending as the tie-break. Rankings must reproduce exactly
    /// across peers holding identical state.
    async fn delegates_by_vote_weight(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Delegate>, StoreError>;
}
