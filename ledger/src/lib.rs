//! Ledger bookkeeping for the Tidepool DPoS protocol.
//!
//! The business-rule layer above plain storage: the vote/unvote ballot state
//! machine, delegate vote-weight bookkeeping, multisig wallet registration,
//! and ordered block/transaction ingestion. Block validation and signature
//! verification happen upstream; data arriving here is already final.
//!
//! Components hold a shared store handle and coordinate multi-step sequences
//! without in-process locking: the upstream block-processing pipeline applies
//! mutations sequentially by contract, and the only atomic primitive is the
//! single-row store operation.

pub mod archive;
pub mod ballots;
pub mod dal;
pub mod error;
pub mod genesis;
pub mod multisig;
pub mod state;
pub mod views;

pub use archive::ChainArchive;
pub use ballots::BallotLedger;
pub use dal::{Dal, DEFAULT_NETWORK_SYMBOL};
pub use error::{InvalidActionError, LedgerError};
pub use genesis::{GenesisAccount, GenesisConfig, GenesisMultisigWallet};
pub use multisig::MultisigRegistry;
pub use state::LedgerState;
pub use views::{Block, BlockTransaction, SignedBlock, SimplifiedBlock};
