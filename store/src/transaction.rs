//! Transaction rows.

use crate::{SortOrder, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_types::{BlockId, Timestamp, TokenAmount, TransactionId, WalletAddress};

/// Which side of a transfer an account scan matches on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    /// The wallet is the recipient.
    Inbound,
    /// The wallet is the sender.
    Outbound,
    /// Either side matches.
    Any,
}

/// One transaction row, keyed by id.
///
/// `index_in_block` is the canonical intra-block order and must round-trip
/// exactly. Signature sets and member address lists are serialized scalars
/// because they are never queried by field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub sender_address: WalletAddress,
    pub recipient_address: Option<WalletAddress>,
    pub amount: TokenAmount,
    pub fee: TokenAmount,
    pub timestamp: Timestamp,
    pub message: Option<String>,
    /// Opaque serialized signature set, when the transaction carries one.
    pub signatures: Option<String>,
    /// Comma-delimited member address list, for multisig registrations.
    pub member_addresses: Option<String>,
    pub block_id: BlockId,
    /// Position in the owning block's transaction sequence, from 0.
    pub index_in_block: u32,
}

/// Storage operations for transaction rows.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert or replace the row keyed by `record.id`.
    async fn upsert_transaction(&self, record: &TransactionRecord)
        -> Result<(), StoreError>;

    async fn transaction_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionRecord>, StoreError>;

    async fn transaction_exists(&self, id: &TransactionId) -> Result<bool, StoreError>;

    /// Page through transactions ordered by timestamp.
    async fn transactions_by_timestamp(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Transactions of one block ordered by `index_in_block`, starting at
    /// index `offset`, capped at `limit` rows when given.
    async fn transactions_in_block(
        &self,
        block_id: &BlockId,
        offset: u32,
        limit: Option<usize>,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Directional account scan ordered by timestamp. A set `from_timestamp`
    /// acts as a pagination cursor: descending scans keep rows with
    /// timestamp <= cursor, ascending scans rows with timestamp >= cursor;
    /// the comparison flips with the sort order so cursors stay stable.
    async fn account_transactions(
        &self,
        wallet: &WalletAddress,
        direction: TransferDirection,
        from_timestamp: Option<Timestamp>,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<TransactionRecord>, StoreError>;

    /// Directional match restricted to one block, in intra-block order.
    async fn block_transactions_for(
        &self,
        wallet: &WalletAddress,
        direction: TransferDirection,
        block_id: &BlockId,
    ) -> Result<Vec<TransactionRecord>, StoreError>;
}
