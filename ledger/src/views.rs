//! Domain block shapes and their read projections.
//!
//! Ingestion accepts a full [`Block`]. Reads return one of two explicit
//! projections instead of reshaping rows ad hoc: [`SimplifiedBlock`] strips
//! all signature material for general consumption, [`SignedBlock`] keeps it
//! and carries the transaction list reconstructed in intra-block order for
//! verification and relay consumers.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tidepool_store::{BlockRecord, StoreError, TransactionRecord};
use tidepool_types::{BlockId, Timestamp, TokenAmount, TransactionId, WalletAddress};

/// A finalized block as handed to the archive: header fields plus the
/// ordered transaction sequence.
///
/// Signature sets are variable-shaped (multisig aggregation) and are never
/// queried by field, so they stay opaque JSON end to end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub height: u64,
    pub timestamp: Timestamp,
    pub previous_block_id: Option<BlockId>,
    pub forger_address: WalletAddress,
    pub forger_signature: String,
    pub signatures: Value,
    pub transactions: Vec<BlockTransaction>,
}

/// A transaction inside a [`Block`].
///
/// Carries no block linkage; the archive stamps `block_id` and
/// `index_in_block` from the position in the sequence on ingestion, and
/// removes them again when reconstructing the list for a [`SignedBlock`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockTransaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub sender_address: WalletAddress,
    pub recipient_address: Option<WalletAddress>,
    pub amount: TokenAmount,
    pub fee: TokenAmount,
    pub timestamp: Timestamp,
    pub message: Option<String>,
    pub signatures: Option<Value>,
    pub member_addresses: Option<Vec<WalletAddress>>,
}

/// Cheap general-consumption projection: header only, signatures stripped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedBlock {
    pub id: BlockId,
    pub height: u64,
    pub timestamp: Timestamp,
    pub previous_block_id: Option<BlockId>,
    pub forger_address: WalletAddress,
    pub synched: bool,
}

/// Verification/relay projection: full signature material plus the
/// transaction list in exact `index_in_block` order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignedBlock {
    pub id: BlockId,
    pub height: u64,
    pub timestamp: Timestamp,
    pub previous_block_id: Option<BlockId>,
    pub forger_address: WalletAddress,
    pub forger_signature: String,
    pub signatures: Value,
    pub synched: bool,
    pub transactions: Vec<BlockTransaction>,
}

impl From<&BlockRecord> for SimplifiedBlock {
    fn from(record: &BlockRecord) -> Self {
        Self {
            id: record.id.clone(),
            height: record.height,
            timestamp: record.timestamp,
            previous_block_id: record.previous_block_id.clone(),
            forger_address: record.forger_address.clone(),
            synched: record.synched,
        }
    }
}

impl SignedBlock {
    /// Rebuild the signed projection from a stored header row and its
    /// already-reconstructed transactions.
    pub fn from_parts(
        record: &BlockRecord,
        transactions: Vec<BlockTransaction>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.id.clone(),
            height: record.height,
            timestamp: record.timestamp,
            previous_block_id: record.previous_block_id.clone(),
            forger_address: record.forger_address.clone(),
            forger_signature: record.forger_signature.clone(),
            signatures: decode_blob(&record.signatures)?,
            synched: record.synched,
            transactions,
        })
    }
}

impl BlockTransaction {
    /// Rebuild the domain transaction from a stored row, dropping the block
    /// linkage fields.
    pub fn from_record(record: &TransactionRecord) -> Result<Self, StoreError> {
        Ok(Self {
            id: record.id.clone(),
            transaction_type: record.transaction_type.clone(),
            sender_address: record.sender_address.clone(),
            recipient_address: record.recipient_address.clone(),
            amount: record.amount,
            fee: record.fee,
            timestamp: record.timestamp,
            message: record.message.clone(),
            signatures: record
                .signatures
                .as_deref()
                .map(decode_blob)
                .transpose()?,
            member_addresses: record
                .member_addresses
                .as_deref()
                .map(split_addresses),
        })
    }
}

/// Serialize an opaque signature set into its stored blob form.
pub(crate) fn encode_blob(value: &Value) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode a stored signature blob back into opaque JSON.
pub(crate) fn decode_blob(raw: &str) -> Result<Value, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Join a member address list into its stored delimited form.
pub(crate) fn join_addresses(addresses: &[WalletAddress]) -> String {
    addresses
        .iter()
        .map(WalletAddress::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

fn split_addresses(raw: &str) -> Vec<WalletAddress> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(WalletAddress::new).collect()
}
