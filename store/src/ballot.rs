//! Ballot rows: the persisted vote/unvote directives.

use crate::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tidepool_types::{BallotId, WalletAddress};

/// Whether a ballot supports or withdraws support from a delegate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BallotType {
    Vote,
    Unvote,
}

/// One ballot row, keyed by id.
///
/// Rows are immutable once written except for `active`, which is cleared
/// when an opposing ballot for the same (voter, delegate) pair supersedes
/// this one. Ballots are never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub id: BallotId,
    #[serde(rename = "type")]
    pub ballot_type: BallotType,
    pub voter_address: WalletAddress,
    pub delegate_address: WalletAddress,
    pub active: bool,
}

/// Conjunction of equality constraints over the queryable ballot columns.
///
/// Unset fields match anything. This is the closed set of columns a ballot
/// may be filtered on.
#[derive(Clone, Debug, Default)]
pub struct BallotFilter {
    pub ballot_type: Option<BallotType>,
    pub voter_address: Option<WalletAddress>,
    pub delegate_address: Option<WalletAddress>,
    pub active: Option<bool>,
}

impl BallotFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ballot_type(mut self, ballot_type: BallotType) -> Self {
        self.ballot_type = Some(ballot_type);
        self
    }

    pub fn voter(mut self, voter: &WalletAddress) -> Self {
        self.voter_address = Some(voter.clone());
        self
    }

    pub fn delegate(mut self, delegate: &WalletAddress) -> Self {
        self.delegate_address = Some(delegate.clone());
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    /// Whether `ballot` satisfies every set constraint.
    pub fn matches(&self, ballot: &Ballot) -> bool {
        self.ballot_type.map_or(true, |t| ballot.ballot_type == t)
            && self
                .voter_address
                .as_ref()
                .map_or(true, |v| ballot.voter_address == *v)
            && self
                .delegate_address
                .as_ref()
                .map_or(true, |d| ballot.delegate_address == *d)
            && self.active.map_or(true, |a| ballot.active == a)
    }
}

/// Storage operations for ballot rows.
#[async_trait]
pub trait BallotStore: Send + Sync {
    /// Insert or replace the row keyed by `ballot.id`.
    async fn upsert_ballot(&self, ballot: &Ballot) -> Result<(), StoreError>;

    async fn ballot_exists(&self, id: &BallotId) -> Result<bool, StoreError>;

    /// All rows matching `filter`, in stable id order.
    async fn find_ballots(&self, filter: &BallotFilter) -> Result<Vec<Ballot>, StoreError>;

    /// Whether any row matches `filter`.
    async fn any_ballot(&self, filter: &BallotFilter) -> Result<bool, StoreError>;

    /// Set `active = false` on every row matching `filter`; returns the
    /// number of rows touched. The only mutation a stored ballot permits.
    async fn deactivate_ballots(&self, filter: &BallotFilter) -> Result<u64, StoreError>;
}
