//! In-memory implementation of `BlockStore`.

use async_trait::async_trait;
use tidepool_store::{BlockRecord, BlockStore, SortOrder, StoreError};
use tidepool_types::{BlockId, Timestamp};

use crate::{lock, page, MemStore};

#[async_trait]
impl BlockStore for MemStore {
    async fn upsert_block(&self, record: &BlockRecord) -> Result<(), StoreError> {
        lock(&self.blocks)?.insert(record.height, record.clone());
        Ok(())
    }

    async fn block_by_id(&self, id: &BlockId) -> Result<Option<BlockRecord>, StoreError> {
        Ok(lock(&self.blocks)?
            .values()
            .find(|record| record.id == *id)
            .cloned())
    }

    async fn block_at_height(
        &self,
        height: u64,
    ) -> Result<Option<BlockRecord>, StoreError> {
        Ok(lock(&self.blocks)?.get(&height).cloned())
    }

    async fn block_exists(&self, id: &BlockId) -> Result<bool, StoreError> {
        Ok(lock(&self.blocks)?.values().any(|record| record.id == *id))
    }

    async fn blocks_from_height(
        &self,
        height: u64,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        Ok(lock(&self.blocks)?
            .range(height..)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn blocks_between_heights(
        &self,
        from: u64,
        to: u64,
        limit: usize,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        if to <= from {
            return Ok(Vec::new());
        }
        Ok(lock(&self.blocks)?
            .range(from + 1..=to)
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn blocks_by_timestamp(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<BlockRecord>, StoreError> {
        // Height-ascending base order; the stable sort keeps it for equal
        // timestamps.
        let mut rows: Vec<BlockRecord> = lock(&self.blocks)?.values().cloned().collect();
        match order {
            SortOrder::Asc => rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            SortOrder::Desc => rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
        }
        Ok(page(rows, offset, limit))
    }

    async fn last_block_at_timestamp(
        &self,
        timestamp: Timestamp,
    ) -> Result<Option<BlockRecord>, StoreError> {
        Ok(lock(&self.blocks)?
            .values()
            .filter(|record| record.timestamp <= timestamp)
            .max_by_key(|record| (record.timestamp, record.height))
            .cloned())
    }

    async fn latest_block(&self) -> Result<Option<BlockRecord>, StoreError> {
        Ok(lock(&self.blocks)?
            .last_key_value()
            .map(|(_, record)| record.clone()))
    }

    async fn block_count(&self) -> Result<u64, StoreError> {
        Ok(lock(&self.blocks)?.len() as u64)
    }
}
