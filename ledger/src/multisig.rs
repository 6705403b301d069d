//! Multisig wallet registration and membership lookups.
//!
//! Registration validates every candidate member before mutating anything.
//! The account mutation and the membership inserts then run as separate
//! store operations; there is no cross-row transaction. A crash in between
//! leaves the account typed multisig with zero or partial membership rows;
//! zero membership rows already read as "not a multisig wallet", and
//! re-running the registration is idempotent, so the recovery path is to
//! re-apply.

use std::sync::Arc;

use tidepool_store::{AccountStore, MembershipStore, MultisigMembership, Store};
use tidepool_types::{AccountType, WalletAddress};
use tracing::debug;

use crate::error::{InvalidActionError, LedgerError};

/// Wallet membership and threshold bookkeeping.
pub struct MultisigRegistry<S> {
    store: Arc<S>,
}

impl<S: Store> MultisigRegistry<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Convert the account at `multisig_address` into a multisig wallet with
    /// the given members and signature threshold.
    ///
    /// Every member must exist, carry a multisig public key
    /// ([`InvalidActionError::MemberNotMultisigCapable`] otherwise), and not
    /// itself be a multisig wallet ([`InvalidActionError::NestedMultisig`]).
    /// Nothing is written until all members pass. Re-registering an existing
    /// wallet is idempotent.
    pub async fn register_wallet(
        &self,
        multisig_address: &WalletAddress,
        member_addresses: &[WalletAddress],
        required_signature_count: u32,
    ) -> Result<(), LedgerError> {
        let accounts = self.store.accounts();
        let mut wallet = accounts
            .get_account(multisig_address)
            .await?
            .ok_or_else(|| InvalidActionError::AccountNotFound(multisig_address.clone()))?;

        for member in member_addresses {
            let account = accounts
                .get_account(member)
                .await?
                .ok_or_else(|| InvalidActionError::AccountNotFound(member.clone()))?;
            if account.multisig_public_key.is_none() {
                return Err(InvalidActionError::MemberNotMultisigCapable(member.clone()).into());
            }
            if account.account_type.is_multisig() {
                return Err(InvalidActionError::NestedMultisig(member.clone()).into());
            }
        }

        wallet.account_type = AccountType::Multisig;
        wallet.required_signature_count = Some(required_signature_count);
        accounts.upsert_account(&wallet).await?;

        // Membership rows follow the account mutation without a transaction;
        // the module docs describe the recovery contract for a crash here.
        for member in member_addresses {
            self.store
                .memberships()
                .upsert_membership(&MultisigMembership {
                    multisig_address: multisig_address.clone(),
                    member_address: member.clone(),
                })
                .await?;
        }
        debug!(
            wallet = %multisig_address,
            members = member_addresses.len(),
            "registered multisig wallet"
        );
        Ok(())
    }

    /// Member addresses of a registered wallet.
    ///
    /// Zero membership rows mean
    /// [`InvalidActionError::MultisigWalletNotFound`], even when an account
    /// exists at the address. Membership rows are the sole signal.
    pub async fn wallet_members(
        &self,
        multisig_address: &WalletAddress,
    ) -> Result<Vec<WalletAddress>, LedgerError> {
        let members = self.store.memberships().members_of(multisig_address).await?;
        if members.is_empty() {
            return Err(
                InvalidActionError::MultisigWalletNotFound(multisig_address.clone()).into(),
            );
        }
        Ok(members)
    }
}
