//! In-memory implementation of `TransactionStore`.

use async_trait::async_trait;
use tidepool_store::{
    SortOrder, StoreError, TransactionRecord, TransactionStore, TransferDirection,
};
use tidepool_types::{BlockId, Timestamp, TransactionId, WalletAddress};

use crate::{lock, page, MemStore};

fn matches_direction(
    record: &TransactionRecord,
    wallet: &WalletAddress,
    direction: TransferDirection,
) -> bool {
    let inbound = record.recipient_address.as_ref() == Some(wallet);
    let outbound = record.sender_address == *wallet;
    match direction {
        TransferDirection::Inbound => inbound,
        TransferDirection::Outbound => outbound,
        TransferDirection::Any => inbound || outbound,
    }
}

/// Cursor acceptance: the comparison flips with the sort order so a page's
/// last timestamp can seed the next call in either direction.
fn passes_cursor(record: &TransactionRecord, cursor: Option<Timestamp>, order: SortOrder) -> bool {
    match (cursor, order) {
        (None, _) => true,
        (Some(from), SortOrder::Desc) => record.timestamp <= from,
        (Some(from), SortOrder::Asc) => record.timestamp >= from,
    }
}

fn sort_by_timestamp(rows: &mut [TransactionRecord], order: SortOrder) {
    match order {
        SortOrder::Asc => rows.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortOrder::Desc => rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }
}

#[async_trait]
impl TransactionStore for MemStore {
    async fn upsert_transaction(
        &self,
        record: &TransactionRecord,
    ) -> Result<(), StoreError> {
        lock(&self.transactions)?.insert(record.id.as_str().to_owned(), record.clone());
        Ok(())
    }

    async fn transaction_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionRecord>, StoreError> {
        Ok(lock(&self.transactions)?.get(id.as_str()).cloned())
    }

    async fn transaction_exists(&self, id: &TransactionId) -> Result<bool, StoreError> {
        Ok(lock(&self.transactions)?.contains_key(id.as_str()))
    }

    async fn transactions_by_timestamp(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let mut rows: Vec<TransactionRecord> =
            lock(&self.transactions)?.values().cloned().collect();
        sort_by_timestamp(&mut rows, order);
        Ok(page(rows, offset, limit))
    }

    async fn transactions_in_block(
        &self,
        block_id: &BlockId,
        offset: u32,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let mut rows: Vec<TransactionRecord> = lock(&self.transactions)?
            .values()
            .filter(|record| record.block_id == *block_id && record.index_in_block >= offset)
            .cloned()
            .collect();
        rows.sort_by_key(|record| record.index_in_block);
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn account_transactions(
        &self,
        wallet: &WalletAddress,
        direction: TransferDirection,
        from_timestamp: Option<Timestamp>,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let mut rows: Vec<TransactionRecord> = lock(&self.transactions)?
            .values()
            .filter(|record| {
                matches_direction(record, wallet, direction)
                    && passes_cursor(record, from_timestamp, order)
            })
            .cloned()
            .collect();
        sort_by_timestamp(&mut rows, order);
        Ok(page(rows, offset, limit))
    }

    async fn block_transactions_for(
        &self,
        wallet: &WalletAddress,
        direction: TransferDirection,
        block_id: &BlockId,
    ) -> Result<Vec<TransactionRecord>, StoreError> {
        let mut rows: Vec<TransactionRecord> = lock(&self.transactions)?
            .values()
            .filter(|record| {
                record.block_id == *block_id && matches_direction(record, wallet, direction)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|record| record.index_in_block);
        Ok(rows)
    }
}
