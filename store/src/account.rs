//! Account row and storage trait.

use crate::{SortOrder, StoreError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_types::{AccountType, TokenAmount, WalletAddress};

/// One account row, keyed by wallet address.
///
/// Balances cross the storage boundary as decimal text. Key material is
/// optional: plain accounts may hold only a signing key, forging-capable
/// accounts add a forging key, and multisig-capable accounts add a multisig
/// key. Each key slot carries the pre-committed next key and its index so
/// key rotation survives a restart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub address: WalletAddress,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: TokenAmount,
    pub sig_public_key: Option<String>,
    pub next_sig_public_key: Option<String>,
    pub next_sig_key_index: Option<u64>,
    pub forging_public_key: Option<String>,
    pub next_forging_public_key: Option<String>,
    pub next_forging_key_index: Option<u64>,
    pub multisig_public_key: Option<String>,
    pub next_multisig_public_key: Option<String>,
    pub next_multisig_key_index: Option<u64>,
    /// Signature threshold; set only while `account_type` is multisig.
    pub required_signature_count: Option<u32>,
    /// Height of the block that last mutated this account.
    pub update_height: u64,
}

impl Account {
    /// A plain single-signature account with no key material registered.
    pub fn new(address: WalletAddress, balance: TokenAmount) -> Self {
        Self {
            address,
            account_type: AccountType::Sig,
            balance,
            sig_public_key: None,
            next_sig_public_key: None,
            next_sig_key_index: None,
            forging_public_key: None,
            next_forging_public_key: None,
            next_forging_key_index: None,
            multisig_public_key: None,
            next_multisig_public_key: None,
            next_multisig_key_index: None,
            required_signature_count: None,
            update_height: 0,
        }
    }
}

/// Typed change packet for [`AccountStore::update_account`].
///
/// Unset fields keep their stored value. This is the closed set of columns
/// an account update may touch.
#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub account_type: Option<AccountType>,
    pub balance: Option<TokenAmount>,
    pub sig_public_key: Option<String>,
    pub next_sig_public_key: Option<String>,
    pub next_sig_key_index: Option<u64>,
    pub forging_public_key: Option<String>,
    pub next_forging_public_key: Option<String>,
    pub next_forging_key_index: Option<u64>,
    pub multisig_public_key: Option<String>,
    pub next_multisig_public_key: Option<String>,
    pub next_multisig_key_index: Option<u64>,
    pub required_signature_count: Option<u32>,
    pub update_height: Option<u64>,
}

impl AccountPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply every set field to `account`.
    pub fn apply(&self, account: &mut Account) {
        if let Some(account_type) = self.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = self.balance {
            account.balance = balance;
        }
        if let Some(key) = &self.sig_public_key {
            account.sig_public_key = Some(key.clone());
        }
        if let Some(key) = &self.next_sig_public_key {
            account.next_sig_public_key = Some(key.clone());
        }
        if let Some(index) = self.next_sig_key_index {
            account.next_sig_key_index = Some(index);
        }
        if let Some(key) = &self.forging_public_key {
            account.forging_public_key = Some(key.clone());
        }
        if let Some(key) = &self.next_forging_public_key {
            account.next_forging_public_key = Some(key.clone());
        }
        if let Some(index) = self.next_forging_key_index {
            account.next_forging_key_index = Some(index);
        }
        if let Some(key) = &self.multisig_public_key {
            account.multisig_public_key = Some(key.clone());
        }
        if let Some(key) = &self.next_multisig_public_key {
            account.next_multisig_public_key = Some(key.clone());
        }
        if let Some(index) = self.next_multisig_key_index {
            account.next_multisig_key_index = Some(index);
        }
        if let Some(count) = self.required_signature_count {
            account.required_signature_count = Some(count);
        }
        if let Some(height) = self.update_height {
            account.update_height = height;
        }
    }
}

/// Storage operations for account rows.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert or fully replace the row keyed by `account.address`.
    async fn upsert_account(&self, account: &Account) -> Result<(), StoreError>;

    async fn get_account(
        &self,
        address: &WalletAddress,
    ) -> Result<Option<Account>, StoreError>;

    async fn account_exists(&self, address: &WalletAddress) -> Result<bool, StoreError>;

    /// Apply `patch` to the stored row. Patching an absent row is a no-op.
    async fn update_account(
        &self,
        address: &WalletAddress,
        patch: &AccountPatch,
    ) -> Result<(), StoreError>;

    /// Page through accounts ordered by numeric balance.
    async fn accounts_by_balance(
        &self,
        offset: usize,
        limit: usize,
        order: SortOrder,
    ) -> Result<Vec<Account>, StoreError>;
}
