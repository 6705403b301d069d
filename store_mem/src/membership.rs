//! In-memory implementation of `MembershipStore`.

use async_trait::async_trait;
use tidepool_store::{MembershipStore, MultisigMembership, StoreError};
use tidepool_types::WalletAddress;

use crate::{lock, MemStore};

#[async_trait]
impl MembershipStore for MemStore {
    async fn upsert_membership(
        &self,
        membership: &MultisigMembership,
    ) -> Result<(), StoreError> {
        lock(&self.memberships)?
            .entry(membership.multisig_address.as_str().to_owned())
            .or_default()
            .insert(membership.member_address.as_str().to_owned());
        Ok(())
    }

    async fn members_of(
        &self,
        multisig_address: &WalletAddress,
    ) -> Result<Vec<WalletAddress>, StoreError> {
        Ok(lock(&self.memberships)?
            .get(multisig_address.as_str())
            .map(|members| {
                members
                    .iter()
                    .map(|member| WalletAddress::new(member.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
