//! Abstract storage traits for the Tidepool ledger.
//!
//! Every storage backend (in-memory, LMDB, SQL) implements these traits; the
//! ledger layer depends only on the traits. All operations are async (each
//! call is a suspension point against the shared external store) and the
//! single-row operation is the only atomic primitive. Multi-row sequences
//! are coordinated by the caller, never by multi-statement transactions
//! here.
//!
//! Queries are expressed through typed filters that enumerate exactly the
//! columns an entity may be matched on; there is no free-form predicate
//! surface.

pub mod account;
pub mod ballot;
pub mod block;
pub mod delegate;
pub mod error;
pub mod membership;
pub mod meta;
pub mod transaction;

pub use account::{Account, AccountPatch, AccountStore};
pub use ballot::{Ballot, BallotFilter, BallotStore, BallotType};
pub use block::{BlockRecord, BlockStore};
pub use delegate::{Delegate, DelegateStore};
pub use error::StoreError;
pub use membership::{MembershipStore, MultisigMembership};
pub use meta::MetaStore;
pub use transaction::{TransactionRecord, TransactionStore, TransferDirection};

use async_trait::async_trait;

/// Scan direction for ordered range queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

/// Aggregate view over every entity store a backend provides.
///
/// Shaped after the per-entity accessor pattern: components receive one
/// store handle and reach the table they need through it. No global
/// singleton exists; the handle is passed into every component constructor.
#[async_trait]
pub trait Store: Send + Sync {
    type Accounts: AccountStore;
    type Delegates: DelegateStore;
    type Ballots: BallotStore;
    type Memberships: MembershipStore;
    type Blocks: BlockStore;
    type Transactions: TransactionStore;
    type Meta: MetaStore;

    fn accounts(&self) -> &Self::Accounts;
    fn delegates(&self) -> &Self::Delegates;
    fn ballots(&self) -> &Self::Ballots;
    fn memberships(&self) -> &Self::Memberships;
    fn blocks(&self) -> &Self::Blocks;
    fn transactions(&self) -> &Self::Transactions;
    fn meta(&self) -> &Self::Meta;

    /// True when no table holds any row. Gates genesis bootstrap.
    async fn is_empty(&self) -> Result<bool, StoreError>;

    /// Drop every row from every table. Maintenance only.
    async fn truncate_all(&self) -> Result<(), StoreError>;
}
