//! Block header rows.

use crate::{SortOrder, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_types::{BlockId, Timestamp, WalletAddress};

/// One block header row.
///
/// Transactions live in their own table, linked back by block id. The
/// aggregate signature set is variable-shaped (multisig aggregation) and is
/// never queried by field, so it is held as one opaque serialized blob
/// instead of structured columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub id: BlockId,
    pub height: u64,
    pub timestamp: Timestamp,
    pub previous_block_id: Option<BlockId>,
    pub forger_address: WalletAddress,
    pub forger_signature: String,
    /// Opaque serialized aggregate signature set.
    pub signatures: String,
    /// Whether the block arrived through sync rather than live forging.
    pub synched: bool,
}

/// Storage operations for block header rows.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Insert or replace the row at `record.height`. Height is the conflict
    /// key, so re-applying a height overwrites the previous occupant; this
    /// is what makes replay and reorg idempotent.
    async fn upsert_block(&self, record: &BlockRecord) -> Result<(), StoreError>;

    async fn block_by_id(&self, id: &BlockId) -> Result<Option<BlockRecord>, StoreError>;

    async fn block_at_height(&self, height: u64)
        -> Result<Option<BlockRecord>, StoreError>;

    async fn block_exists(&self, id: &BlockId) -> Result<bool, StoreError>;

    /// Up to `limit` blocks with height >= `height`, ascending.
    async fn blocks_from_height(
        &self,
        height: u64,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError>;

    /// Up to `limit` blocks with `from < height <= to`, ascending.
    async fn blocks_between_heights(
        &self,
        from: u64,
        to: u64,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError>;

    /// Page through blocks ordered by timestamp.
    async fn blocks_by_timestamp(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<BlockRecord>, StoreError>;

    /// The highest-timestamp block with timestamp <= `timestamp`.
    async fn last_block_at_timestamp(
        &self,
        timestamp: Timestamp,
    ) -> Result<Option<BlockRecord>, StoreError>;

    /// The highest block in the chain, if any.
    async fn latest_block(&self) -> Result<Option<BlockRecord>, StoreError>;

    async fn block_count(&self) -> Result<u64, StoreError>;
}
