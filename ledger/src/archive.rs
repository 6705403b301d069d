//! The block/transaction archive: ordered, append-mostly chain history.
//!
//! Ingestion splits a finalized block into a scalar header row and one row
//! per transaction, stamped with the owning block id and its position in
//! the caller-supplied sequence. That index is the canonical intra-block
//! order and round-trips exactly. Header upserts are keyed by height, so
//! replaying a height (retry, reorg) overwrites the previous occupant;
//! transaction upserts are keyed by id.

use std::sync::Arc;

use tidepool_store::{
    BlockRecord, BlockStore, SortOrder, Store, TransactionRecord, TransactionStore,
    TransferDirection,
};
use tidepool_types::{BlockId, Timestamp, TransactionId, WalletAddress};
use tracing::debug;

use crate::error::{InvalidActionError, LedgerError};
use crate::views::{encode_blob, join_addresses, Block, BlockTransaction, SignedBlock, SimplifiedBlock};

/// Chain history bookkeeping over the block and transaction tables.
pub struct ChainArchive<S> {
    store: Arc<S>,
}

impl<S: Store> ChainArchive<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Archive a finalized block and its transactions.
    ///
    /// `synched` marks blocks that arrived through sync rather than live
    /// forging. The header row and the transaction rows are separate
    /// single-row upserts; re-running the whole call is idempotent.
    pub async fn upsert_block(&self, block: &Block, synched: bool) -> Result<(), LedgerError> {
        let record = BlockRecord {
            id: block.id.clone(),
            height: block.height,
            timestamp: block.timestamp,
            previous_block_id: block.previous_block_id.clone(),
            forger_address: block.forger_address.clone(),
            forger_signature: block.forger_signature.clone(),
            signatures: encode_blob(&block.signatures)?,
            synched,
        };
        self.store.blocks().upsert_block(&record).await?;

        for (index, transaction) in block.transactions.iter().enumerate() {
            let record = TransactionRecord {
                id: transaction.id.clone(),
                transaction_type: transaction.transaction_type.clone(),
                sender_address: transaction.sender_address.clone(),
                recipient_address: transaction.recipient_address.clone(),
                amount: transaction.amount,
                fee: transaction.fee,
                timestamp: transaction.timestamp,
                message: transaction.message.clone(),
                signatures: transaction
                    .signatures
                    .as_ref()
                    .map(encode_blob)
                    .transpose()?,
                member_addresses: transaction
                    .member_addresses
                    .as_deref()
                    .map(join_addresses),
                block_id: block.id.clone(),
                index_in_block: index as u32,
            };
            self.store.transactions().upsert_transaction(&record).await?;
        }
        debug!(
            block = %block.id,
            height = block.height,
            transactions = block.transactions.len(),
            "archived block"
        );
        Ok(())
    }

    /// The simplified projection of the block with this id.
    pub async fn get_block(&self, id: &BlockId) -> Result<SimplifiedBlock, LedgerError> {
        let record = self
            .store
            .blocks()
            .block_by_id(id)
            .await?
            .ok_or_else(|| InvalidActionError::BlockNotFound(format!("id {id}")))?;
        Ok(SimplifiedBlock::from(&record))
    }

    /// The signed projection of the block with this id, transactions
    /// reconstructed in intra-block order.
    pub async fn signed_block(&self, id: &BlockId) -> Result<SignedBlock, LedgerError> {
        let record = self
            .store
            .blocks()
            .block_by_id(id)
            .await?
            .ok_or_else(|| InvalidActionError::BlockNotFound(format!("id {id}")))?;
        self.attach_transactions(record).await
    }

    pub async fn has_block(&self, id: &BlockId) -> Result<bool, LedgerError> {
        Ok(self.store.blocks().block_exists(id).await?)
    }

    pub async fn block_at_height(&self, height: u64) -> Result<SimplifiedBlock, LedgerError> {
        let record = self
            .store
            .blocks()
            .block_at_height(height)
            .await?
            .ok_or_else(|| InvalidActionError::BlockNotFound(format!("height {height}")))?;
        Ok(SimplifiedBlock::from(&record))
    }

    pub async fn signed_block_at_height(&self, height: u64) -> Result<SignedBlock, LedgerError> {
        let record = self
            .store
            .blocks()
            .block_at_height(height)
            .await?
            .ok_or_else(|| InvalidActionError::BlockNotFound(format!("height {height}")))?;
        self.attach_transactions(record).await
    }

    /// Up to `limit` simplified blocks from `height` upward. Heights below 1
    /// are clamped to 1.
    pub async fn blocks_from_height(
        &self,
        height: u64,
        limit: usize,
    ) -> Result<Vec<SimplifiedBlock>, LedgerError> {
        let records = self
            .store
            .blocks()
            .blocks_from_height(height.max(1), limit)
            .await?;
        Ok(records.iter().map(SimplifiedBlock::from).collect())
    }

    /// Up to `limit` signed blocks from `height` upward, each with its
    /// transaction list.
    pub async fn signed_blocks_from_height(
        &self,
        height: u64,
        limit: usize,
    ) -> Result<Vec<SignedBlock>, LedgerError> {
        let records = self
            .store
            .blocks()
            .blocks_from_height(height.max(1), limit)
            .await?;
        let mut blocks = Vec::with_capacity(records.len());
        for record in records {
            blocks.push(self.attach_transactions(record).await?);
        }
        Ok(blocks)
    }

    /// Simplified blocks with `from < height <= to`, ascending.
    pub async fn blocks_between_heights(
        &self,
        from: u64,
        to: u64,
        limit: usize,
    ) -> Result<Vec<SimplifiedBlock>, LedgerError> {
        let records = self
            .store
            .blocks()
            .blocks_between_heights(from, to, limit)
            .await?;
        Ok(records.iter().map(SimplifiedBlock::from).collect())
    }

    /// Simplified blocks paged by timestamp.
    pub async fn blocks_by_timestamp(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<SimplifiedBlock>, LedgerError> {
        let records = self
            .store
            .blocks()
            .blocks_by_timestamp(offset, limit, order)
            .await?;
        Ok(records.iter().map(SimplifiedBlock::from).collect())
    }

    /// The latest block at or before `timestamp`, simplified.
    pub async fn last_block_at_timestamp(
        &self,
        timestamp: Timestamp,
    ) -> Result<SimplifiedBlock, LedgerError> {
        let record = self
            .store
            .blocks()
            .last_block_at_timestamp(timestamp)
            .await?
            .ok_or_else(|| {
                InvalidActionError::BlockNotFound(format!("timestamp at or before {timestamp}"))
            })?;
        Ok(SimplifiedBlock::from(&record))
    }

    /// The chain tip, simplified. `None` on an empty chain.
    pub async fn last_block(&self) -> Result<Option<SimplifiedBlock>, LedgerError> {
        Ok(self
            .store
            .blocks()
            .latest_block()
            .await?
            .as_ref()
            .map(SimplifiedBlock::from))
    }

    /// The chain tip height, derived from the block row count (the chain
    /// is dense from height 1, so count and tip coincide).
    pub async fn max_block_height(&self) -> Result<u64, LedgerError> {
        Ok(self.store.blocks().block_count().await?)
    }

    /// The stored row for a transaction, or
    /// [`InvalidActionError::TransactionNotFound`].
    pub async fn get_transaction(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionRecord, LedgerError> {
        self.store
            .transactions()
            .transaction_by_id(id)
            .await?
            .ok_or_else(|| InvalidActionError::TransactionNotFound(id.clone()).into())
    }

    pub async fn has_transaction(&self, id: &TransactionId) -> Result<bool, LedgerError> {
        Ok(self.store.transactions().transaction_exists(id).await?)
    }

    /// Transaction rows paged by timestamp.
    pub async fn transactions_by_timestamp(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .transactions_by_timestamp(offset, limit, order)
            .await?)
    }

    /// Transaction rows of one block in `index_in_block` order, starting at
    /// index `offset`, capped at `limit` rows when given.
    pub async fn transactions_in_block(
        &self,
        block_id: &BlockId,
        offset: u32,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .transactions_in_block(block_id, offset, limit)
            .await?)
    }

    /// Transactions touching `wallet` on either side, timestamp-ordered,
    /// with the optional cursor semantics of
    /// [`tidepool_store::TransactionStore::account_transactions`].
    pub async fn account_transactions(
        &self,
        wallet: &WalletAddress,
        from_timestamp: Option<Timestamp>,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .account_transactions(wallet, TransferDirection::Any, from_timestamp, offset, limit, order)
            .await?)
    }

    /// Transactions received by `wallet`.
    pub async fn inbound_transactions(
        &self,
        wallet: &WalletAddress,
        from_timestamp: Option<Timestamp>,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .account_transactions(
                wallet,
                TransferDirection::Inbound,
                from_timestamp,
                offset,
                limit,
                order,
            )
            .await?)
    }

    /// Transactions sent by `wallet`.
    pub async fn outbound_transactions(
        &self,
        wallet: &WalletAddress,
        from_timestamp: Option<Timestamp>,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .account_transactions(
                wallet,
                TransferDirection::Outbound,
                from_timestamp,
                offset,
                limit,
                order,
            )
            .await?)
    }

    /// Transactions received by `wallet` within one block.
    pub async fn inbound_transactions_in_block(
        &self,
        wallet: &WalletAddress,
        block_id: &BlockId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .block_transactions_for(wallet, TransferDirection::Inbound, block_id)
            .await?)
    }

    /// Transactions sent by `wallet` within one block.
    pub async fn outbound_transactions_in_block(
        &self,
        wallet: &WalletAddress,
        block_id: &BlockId,
    ) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self
            .store
            .transactions()
            .block_transactions_for(wallet, TransferDirection::Outbound, block_id)
            .await?)
    }

    /// Assemble the signed projection: decode the header blob and rebuild
    /// the transaction list, linkage fields removed.
    async fn attach_transactions(&self, record: BlockRecord) -> Result<SignedBlock, LedgerError> {
        let rows = self
            .store
            .transactions()
            .transactions_in_block(&record.id, 0, None)
            .await?;
        let mut transactions = Vec::with_capacity(rows.len());
        for row in &rows {
            transactions.push(BlockTransaction::from_record(row)?);
        }
        Ok(SignedBlock::from_parts(&record, transactions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tidepool_store_mem::MemStore;
    use tidepool_types::TokenAmount;

    fn archive() -> ChainArchive<MemStore> {
        ChainArchive::new(Arc::new(MemStore::new()))
    }

    fn transaction(id: &str, timestamp: u64) -> BlockTransaction {
        BlockTransaction {
            id: TransactionId::new(id),
            transaction_type: "transfer".into(),
            sender_address: WalletAddress::new("tdpl_sender"),
            recipient_address: Some(WalletAddress::new("tdpl_recipient")),
            amount: TokenAmount::from_u64(25),
            fee: TokenAmount::from_u64(1),
            timestamp: Timestamp::new(timestamp),
            message: None,
            signatures: Some(json!([{"signerAddress": "tdpl_sender", "signature": "aa"}])),
            member_addresses: None,
        }
    }

    fn block(id: &str, height: u64, timestamp: u64, transactions: Vec<BlockTransaction>) -> Block {
        Block {
            id: BlockId::new(id),
            height,
            timestamp: Timestamp::new(timestamp),
            previous_block_id: (height > 1).then(|| BlockId::new(format!("blk{}", height - 1))),
            forger_address: WalletAddress::new("tdpl_forger"),
            forger_signature: "forger-sig".into(),
            signatures: json!([{"signerAddress": "tdpl_forger", "signature": "ff"}]),
            transactions,
        }
    }

    #[tokio::test]
    async fn transactions_round_trip_in_supplied_order() {
        let archive = archive();
        let transactions = vec![
            transaction("t-c", 300),
            transaction("t-a", 100),
            transaction("t-b", 200),
        ];
        archive
            .upsert_block(&block("blk1", 1, 1000, transactions.clone()), true)
            .await
            .unwrap();

        let signed = archive.signed_block(&BlockId::new("blk1")).await.unwrap();
        assert_eq!(signed.transactions, transactions);
        assert!(signed.synched);

        let rows = archive
            .transactions_in_block(&BlockId::new("blk1"), 0, None)
            .await
            .unwrap();
        let indices: Vec<u32> = rows.iter().map(|r| r.index_in_block).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn simplified_strips_signatures_signed_keeps_them() {
        let archive = archive();
        archive
            .upsert_block(&block("blk1", 1, 1000, vec![transaction("t1", 100)]), false)
            .await
            .unwrap();

        let simplified = archive.get_block(&BlockId::new("blk1")).await.unwrap();
        let as_json = serde_json::to_value(&simplified).unwrap();
        assert!(as_json.get("signatures").is_none());
        assert!(as_json.get("forger_signature").is_none());

        let signed = archive.signed_block(&BlockId::new("blk1")).await.unwrap();
        assert_eq!(signed.forger_signature, "forger-sig");
        assert!(signed.signatures.is_array());
        assert!(signed.transactions[0].signatures.is_some());
    }

    #[tokio::test]
    async fn replaying_a_height_overwrites_the_block() {
        let archive = archive();
        archive
            .upsert_block(&block("blk1", 1, 1000, vec![]), false)
            .await
            .unwrap();
        archive
            .upsert_block(&block("blk1-reorg", 1, 1100, vec![]), true)
            .await
            .unwrap();

        assert_eq!(archive.max_block_height().await.unwrap(), 1);
        let tip = archive.block_at_height(1).await.unwrap();
        assert_eq!(tip.id, BlockId::new("blk1-reorg"));
        assert!(!archive.has_block(&BlockId::new("blk1")).await.unwrap());
    }

    #[tokio::test]
    async fn from_height_clamps_below_one() {
        let archive = archive();
        for height in 1..=3 {
            archive
                .upsert_block(&block(&format!("blk{height}"), height, height * 100, vec![]), false)
                .await
                .unwrap();
        }
        let blocks = archive.blocks_from_height(0, 10).await.unwrap();
        let heights: Vec<u64> = blocks.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_lookups_carry_block_not_found() {
        let archive = archive();
        assert!(matches!(
            archive.get_block(&BlockId::new("nope")).await.unwrap_err(),
            LedgerError::InvalidAction(InvalidActionError::BlockNotFound(_))
        ));
        assert!(matches!(
            archive.block_at_height(9).await.unwrap_err(),
            LedgerError::InvalidAction(InvalidActionError::BlockNotFound(_))
        ));
        assert!(matches!(
            archive
                .last_block_at_timestamp(Timestamp::new(5))
                .await
                .unwrap_err(),
            LedgerError::InvalidAction(InvalidActionError::BlockNotFound(_))
        ));
        assert!(matches!(
            archive
                .get_transaction(&TransactionId::new("nope"))
                .await
                .unwrap_err(),
            LedgerError::InvalidAction(InvalidActionError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn member_addresses_survive_the_delimited_column() {
        let archive = archive();
        let mut registration = transaction("t1", 100);
        registration.transaction_type = "registerMultisigWallet".into();
        registration.member_addresses = Some(vec![
            WalletAddress::new("tdpl_m1"),
            WalletAddress::new("tdpl_m2"),
        ]);
        archive
            .upsert_block(&block("blk1", 1, 1000, vec![registration.clone()]), false)
            .await
            .unwrap();

        let row = archive
            .get_transaction(&TransactionId::new("t1"))
            .await
            .unwrap();
        assert_eq!(row.member_addresses.as_deref(), Some("tdpl_m1,tdpl_m2"));

        let signed = archive.signed_block(&BlockId::new("blk1")).await.unwrap();
        assert_eq!(signed.transactions[0], registration);
    }

    #[tokio::test]
    async fn last_block_is_the_tip() {
        let archive = archive();
        assert!(archive.last_block().await.unwrap().is_none());
        archive.upsert_block(&block("blk1", 1, 100, vec![]), false).await.unwrap();
        archive.upsert_block(&block("blk2", 2, 200, vec![]), false).await.unwrap();
        let tip = archive.last_block().await.unwrap().unwrap();
        assert_eq!(tip.height, 2);
    }
}
