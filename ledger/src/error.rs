use thiserror::Error;
use tidepool_store::StoreError;
use tidepool_types::{TransactionId, WalletAddress};

/// A precondition failure: an expected business condition, reported with a
/// specific sub-kind so callers can branch on it rather than on message
/// text. Never retried internally.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvalidActionError {
    #[error("account {0} does not exist")]
    AccountNotFound(WalletAddress),

    #[error("voter {voter} has already voted for delegate {delegate}")]
    VoterAlreadyVoted {
        voter: WalletAddress,
        delegate: WalletAddress,
    },

    #[error("voter {voter} is not voting for delegate {delegate}")]
    VoterNotVoting {
        voter: WalletAddress,
        delegate: WalletAddress,
    },

    #[error("account {0} is not registered for multisig so it cannot be a member of a multisig wallet")]
    MemberNotMultisigCapable(WalletAddress),

    #[error("account {0} is a multisig wallet so it cannot be a member of another multisig wallet")]
    NestedMultisig(WalletAddress),

    #[error("address {0} is not registered as a multisig wallet")]
    MultisigWalletNotFound(WalletAddress),

    /// The lookup key (id, height, or timestamp bound) that found no block.
    #[error("no block existed for {0}")]
    BlockNotFound(String),

    #[error("transaction {0} does not exist")]
    TransactionNotFound(TransactionId),

    #[error("delegate {0} does not exist")]
    DelegateNotFound(WalletAddress),
}

/// Any failure surfaced by the ledger layer.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A business precondition failed; see the sub-kind.
    #[error(transparent)]
    InvalidAction(#[from] InvalidActionError),

    /// The storage backend failed. Fatal to the in-flight call; retry policy
    /// belongs to the caller.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
