//! Multisig wallet membership rows.

use crate::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_types::WalletAddress;

/// One membership row; the (wallet, member) pair is the storage key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultisigMembership {
    pub multisig_address: WalletAddress,
    pub member_address: WalletAddress,
}

/// Storage operations for membership rows.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Insert the pair if absent; re-inserting an existing pair is a no-op.
    async fn upsert_membership(
        &self,
        membership: &MultisigMembership,
    ) -> Result<(), StoreError>;

    /// Member addresses of a wallet, ascending. Empty when the address has
    /// no membership rows; the caller decides what absence means.
    async fn members_of(
        &self,
        multisig_address: &WalletAddress,
    ) -> Result<Vec<WalletAddress>, StoreError>;
}
