//! Ledger state: accounts and delegates keyed by address.
//!
//! Thin rule layer over the account and delegate tables: existence-checked
//! reads with the proper invalid-action sub-kinds, typed-patch updates, and
//! the paginated index scans the upstream service exposes.

use std::sync::Arc;

use tidepool_store::{
    Account, AccountPatch, AccountStore, Delegate, DelegateStore, SortOrder, Store,
};
use tidepool_types::WalletAddress;

use crate::error::{InvalidActionError, LedgerError};

/// Account and delegate bookkeeping.
pub struct LedgerState<S> {
    store: Arc<S>,
}

impl<S: Store> LedgerState<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub async fn upsert_account(&self, account: &Account) -> Result<(), LedgerError> {
        Ok(self.store.accounts().upsert_account(account).await?)
    }

    /// The account at `address`, or [`InvalidActionError::AccountNotFound`].
    pub async fn get_account(&self, address: &WalletAddress) -> Result<Account, LedgerError> {
        self.store
            .accounts()
            .get_account(address)
            .await?
            .ok_or_else(|| InvalidActionError::AccountNotFound(address.clone()).into())
    }

    pub async fn has_account(&self, address: &WalletAddress) -> Result<bool, LedgerError> {
        Ok(self.store.accounts().account_exists(address).await?)
    }

    /// Apply a typed change packet to the account at `address`.
    pub async fn update_account(
        &self,
        address: &WalletAddress,
        patch: &AccountPatch,
    ) -> Result<(), LedgerError> {
        Ok(self.store.accounts().update_account(address, patch).await?)
    }

    /// Accounts paged by numeric balance.
    pub async fn accounts_by_balance(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Account>, LedgerError> {
        Ok(self
            .store
            .accounts()
            .accounts_by_balance(offset, limit, order)
            .await?)
    }

    pub async fn upsert_delegate(&self, delegate: &Delegate) -> Result<(), LedgerError> {
        Ok(self.store.delegates().upsert_delegate(delegate).await?)
    }

    /// The delegate at `address`, or [`InvalidActionError::DelegateNotFound`].
    pub async fn get_delegate(&self, address: &WalletAddress) -> Result<Delegate, LedgerError> {
        self.store
            .delegates()
            .get_delegate(address)
            .await?
            .ok_or_else(|| InvalidActionError::DelegateNotFound(address.clone()).into())
    }

    pub async fn has_delegate(&self, address: &WalletAddress) -> Result<bool, LedgerError> {
        Ok(self.store.delegates().delegate_exists(address).await?)
    }

    /// Delegates ranked by vote weight in `order`, address ascending on
    /// ties, so the ranking reproduces across peers with identical state.
    pub async fn delegates_by_vote_weight(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Delegate>, LedgerError> {
        Ok(self
            .store
            .delegates()
            .delegates_by_vote_weight(offset, limit, order)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_store_mem::MemStore;
    use tidepool_types::TokenAmount;

    fn state() -> LedgerState<MemStore> {
        LedgerState::new(Arc::new(MemStore::new()))
    }

    fn addr(raw: &str) -> WalletAddress {
        WalletAddress::new(raw)
    }

    #[tokio::test]
    async fn get_account_maps_absence_to_invalid_action() {
        let state = state();
        let err = state.get_account(&addr("tdpl_ghost")).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAction(InvalidActionError::AccountNotFound(_))
        ));
    }

    #[tokio::test]
    async fn get_delegate_maps_absence_to_invalid_action() {
        let state = state();
        let err = state.get_delegate(&addr("tdpl_ghost")).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAction(InvalidActionError::DelegateNotFound(_))
        ));
    }

    #[tokio::test]
    async fn patch_round_trips_through_update() {
        let state = state();
        let account = Account::new(addr("tdpl_a"), TokenAmount::from_u64(10));
        state.upsert_account(&account).await.unwrap();

        let patch = AccountPatch {
            balance: Some(TokenAmount::from_u64(99)),
            update_height: Some(3),
            ..AccountPatch::new()
        };
        state.update_account(&addr("tdpl_a"), &patch).await.unwrap();

        let stored = state.get_account(&addr("tdpl_a")).await.unwrap();
        assert_eq!(stored.balance, TokenAmount::from_u64(99));
        assert_eq!(stored.update_height, 3);
    }

    #[tokio::test]
    async fn delegate_ranking_with_duplicate_weights_is_deterministic() {
        let state = state();
        for (address, weight) in [
            ("tdpl_zed", 700),
            ("tdpl_ann", 700),
            ("tdpl_mia", 900),
            ("tdpl_kit", 100),
        ] {
            state
                .upsert_delegate(&Delegate {
                    address: addr(address),
                    vote_weight: TokenAmount::from_u64(weight),
                })
                .await
                .unwrap();
        }

        let ranked = state
            .delegates_by_vote_weight(0, 10, SortOrder::Desc)
            .await
            .unwrap();
        let addresses: Vec<&str> = ranked.iter().map(|d| d.address.as_str()).collect();
        assert_eq!(addresses, vec!["tdpl_mia", "tdpl_ann", "tdpl_zed", "tdpl_kit"]);
    }
}
