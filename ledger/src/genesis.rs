//! Genesis input shapes: the one-time seed applied to an empty store.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tidepool_store::Account;
use tidepool_types::{AccountType, BallotId, TokenAmount, WalletAddress};

/// Random bytes in a generated genesis ballot id.
const BALLOT_ID_BYTES: usize = 20;

/// The full genesis payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Network identifier; defaults to [`crate::dal::DEFAULT_NETWORK_SYMBOL`].
    #[serde(default)]
    pub network_symbol: Option<String>,
    pub accounts: Vec<GenesisAccount>,
    #[serde(default)]
    pub multisig_wallets: Vec<GenesisMultisigWallet>,
}

/// One seeded account, with the delegates it votes for.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: WalletAddress,
    pub balance: TokenAmount,
    #[serde(default, rename = "type")]
    pub account_type: Option<AccountType>,
    #[serde(default)]
    pub sig_public_key: Option<String>,
    /// Present on accounts that may forge; creates the delegate row.
    #[serde(default)]
    pub forging_public_key: Option<String>,
    #[serde(default)]
    pub multisig_public_key: Option<String>,
    #[serde(default)]
    pub votes: Vec<WalletAddress>,
}

/// One seeded multisig wallet, registered after all accounts exist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisMultisigWallet {
    pub address: WalletAddress,
    pub members: Vec<WalletAddress>,
    pub required_signature_count: u32,
}

impl GenesisAccount {
    /// The account row this genesis entry seeds, at update height zero.
    pub(crate) fn to_account(&self) -> Account {
        Account {
            account_type: self.account_type.unwrap_or_default(),
            sig_public_key: self.sig_public_key.clone(),
            forging_public_key: self.forging_public_key.clone(),
            multisig_public_key: self.multisig_public_key.clone(),
            ..Account::new(self.address.clone(), self.balance)
        }
    }
}

/// A fresh random ballot id for a genesis vote.
pub(crate) fn random_ballot_id() -> BallotId {
    let mut bytes = [0u8; BALLOT_ID_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    BallotId::new(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_account_defaults_to_sig_type_at_height_zero() {
        let entry = GenesisAccount {
            address: WalletAddress::new("tdpl_a"),
            balance: TokenAmount::from_u64(100),
            account_type: None,
            sig_public_key: None,
            forging_public_key: Some("fkey".into()),
            multisig_public_key: None,
            votes: vec![],
        };
        let account = entry.to_account();
        assert_eq!(account.account_type, AccountType::Sig);
        assert_eq!(account.update_height, 0);
        assert_eq!(account.forging_public_key.as_deref(), Some("fkey"));
    }

    #[test]
    fn ballot_ids_are_distinct_hex() {
        let a = random_ballot_id();
        let b = random_ballot_id();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), BALLOT_ID_BYTES * 2);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn config_deserializes_with_optional_sections() {
        let raw = r#"{
            "accounts": [
                {"address": "tdpl_a", "balance": "1000", "votes": ["tdpl_d"]}
            ]
        }"#;
        let config: GenesisConfig = serde_json::from_str(raw).unwrap();
        assert!(config.network_symbol.is_none());
        assert_eq!(config.accounts.len(), 1);
        assert!(config.multisig_wallets.is_empty());
        assert_eq!(config.accounts[0].votes.len(), 1);
    }
}
