//! The data-access layer facade.
//!
//! [`Dal`] wires one store handle into each component and carries the
//! cross-cutting pieces: genesis bootstrap, the key-value checkpoint store,
//! the network symbol, and maintenance truncation.

use std::sync::Arc;

use futures_util::future::try_join_all;
use tidepool_store::{Delegate, MetaStore, Store, StoreError};
use tidepool_types::TokenAmount;
use tracing::{debug, info};

use crate::archive::ChainArchive;
use crate::ballots::BallotLedger;
use crate::error::LedgerError;
use crate::genesis::{self, GenesisConfig};
use crate::multisig::MultisigRegistry;
use crate::state::LedgerState;

/// Network symbol used when genesis does not name one.
pub const DEFAULT_NETWORK_SYMBOL: &str = "tide";

/// The persistence facade consumed by the ledger service.
pub struct Dal<S> {
    store: Arc<S>,
    network_symbol: String,
    state: LedgerState<S>,
    ballots: BallotLedger<S>,
    multisig: MultisigRegistry<S>,
    archive: ChainArchive<S>,
}

impl<S: Store> Dal<S> {
    /// Build a DAL over `store` without touching it. [`Dal::init`] is the
    /// usual entry point.
    pub fn new(store: Arc<S>, network_symbol: impl Into<String>) -> Self {
        Self {
            state: LedgerState::new(Arc::clone(&store)),
            ballots: BallotLedger::new(Arc::clone(&store)),
            multisig: MultisigRegistry::new(Arc::clone(&store)),
            archive: ChainArchive::new(Arc::clone(&store)),
            store,
            network_symbol: network_symbol.into(),
        }
    }

    /// Build a DAL and seed genesis state only when the store is
    /// empty.
    ///
    /// The emptiness guard makes bootstrap idempotent: against a non-empty
    /// store this records the network symbol and performs zero mutations.
    /// Seeding runs in three phases: account (and delegate) rows fan out
    /// concurrently, the ballot phase runs sequentially because every vote
    /// read-modifies a shared delegate's weight, and wallet registrations
    /// fan out again.
    pub async fn init(store: Arc<S>, config: GenesisConfig) -> Result<Self, LedgerError> {
        let symbol = config
            .network_symbol
            .clone()
            .unwrap_or_else(|| DEFAULT_NETWORK_SYMBOL.to_owned());
        let dal = Self::new(store, symbol);

        if !dal.store.is_empty().await? {
            debug!("store already seeded; skipping genesis bootstrap");
            return Ok(dal);
        }
        info!(
            accounts = config.accounts.len(),
            wallets = config.multisig_wallets.len(),
            "seeding genesis state"
        );

        let state = &dal.state;
        try_join_all(config.accounts.iter().map(|entry| async move {
            state.upsert_account(&entry.to_account()).await?;
            if entry.forging_public_key.is_some() {
                state
                    .upsert_delegate(&Delegate {
                        address: entry.address.clone(),
                        vote_weight: TokenAmount::zero(),
                    })
                    .await?;
            }
            Ok::<(), LedgerError>(())
        }))
        .await?;

        for entry in &config.accounts {
            for delegate_address in &entry.votes {
                dal.ballots
                    .vote(genesis::random_ballot_id(), &entry.address, delegate_address)
                    .await?;
                let delegate = dal.state.get_delegate(delegate_address).await?;
                let vote_weight = delegate.vote_weight.checked_add(entry.balance).ok_or_else(
                    || {
                        StoreError::Serialization(format!(
                            "vote weight overflow for delegate {delegate_address}"
                        ))
                    },
                )?;
                dal.state
                    .upsert_delegate(&Delegate {
                        address: delegate_address.clone(),
                        vote_weight,
                    })
                    .await?;
            }
        }

        let registry = &dal.multisig;
        try_join_all(config.multisig_wallets.iter().map(|wallet| {
            registry.register_wallet(&wallet.address, &wallet.members, wallet.required_signature_count)
        }))
        .await?;

        Ok(dal)
    }

    /// Account and delegate state.
    pub fn state(&self) -> &LedgerState<S> {
        &self.state
    }

    /// The vote/unvote ballot ledger.
    pub fn ballots(&self) -> &BallotLedger<S> {
        &self.ballots
    }

    /// Multisig wallet registration and lookups.
    pub fn multisig(&self) -> &MultisigRegistry<S> {
        &self.multisig
    }

    /// Block and transaction history.
    pub fn archive(&self) -> &ChainArchive<S> {
        &self.archive
    }

    /// The network identifier this ledger was bootstrapped with.
    pub fn network_symbol(&self) -> &str {
        &self.network_symbol
    }

    /// Save consumer checkpoint metadata under `key`, overwriting.
    pub async fn save_item(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        Ok(self.store.meta().put_item(key, value).await?)
    }

    /// Load checkpoint metadata, `None` if never saved.
    pub async fn load_item(&self, key: &str) -> Result<Option<String>, LedgerError> {
        Ok(self.store.meta().get_item(key).await?)
    }

    /// Drop every row from every table. Maintenance only.
    pub async fn clear_all_data(&self) -> Result<(), LedgerError> {
        Ok(self.store.truncate_all().await?)
    }
}
