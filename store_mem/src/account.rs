//! In-memory implementation of `AccountStore`.

use async_trait::async_trait;
use tidepool_store::{Account, AccountPatch, AccountStore, SortOrder, StoreError};
use tidepool_types::WalletAddress;

use crate::{lock, page, MemStore};

#[async_trait]
impl AccountStore for MemStore {
    async fn upsert_account(&self, account: &Account) -> Result<(), StoreError> {
        lock(&self.accounts)?.insert(account.address.as_str().to_owned(), account.clone());
        Ok(())
    }

    async fn get_account(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<Account>, StoreError> {
        Ok(lock(&self.accounts)?.get(address.as_str()).cloned())
    }

    async fn account_exists(&self, address: &WalletAddress) -> Result<bool, StoreError> {
        Ok(lock(&self.accounts)?.contains_key(address.as_str()))
    }

    async fn update_account(
        &self,
        address: &WalletAddress,
        patch: &AccountPatch,
    ) -> Result<(), StoreError> {
        if let Some(account) = lock(&self.accounts)?.get_mut(address.as_str()) {
            patch.apply(account);
        }
        Ok(())
    }

    async fn accounts_by_balance(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Account>, StoreError> {
        // Map order is address-ascending; the stable sort keeps that as the
        // tie-break between equal balances.
        let mut rows: Vec<Account> = lock(&self.accounts)?.values().cloned().collect();
        match order {
            SortOrder::Asc => rows.sort_by(|a, b| a.balance.cmp(&b.balance)),
            SortOrder::Desc => rows.sort_by(|a, b| b.balance.cmp(&a.balance)),
        }
        Ok(page(rows, offset, limit))
    }
}
