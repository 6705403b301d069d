//! The ballot ledger: a vote/unvote state machine over (voter, delegate)
//! pairs.
//!
//! Each pair is in one of three states: no ballot, active vote, or active
//! unvote. Recording a ballot deactivates the opposing active ballot for the
//! pair (ballot supersede). Idempotency is keyed strictly by ballot id, not
//! by the pair: replaying an id that is already stored skips validation
//! entirely, so a retried block application can never trip over its own
//! earlier writes.
//!
//! Vote weight is NOT adjusted here. The caller applying a vote or unvote
//! must adjust the target delegate's vote weight by the voter's balance in
//! the same commit group as any balance-affecting transaction, because the two
//! must move together. Genesis bootstrap does exactly this; see
//! [`crate::dal::Dal::init`].

use std::sync::Arc;

use tidepool_store::{AccountStore, Ballot, BallotFilter, BallotStore, BallotType, Store};
use tidepool_types::{BallotId, WalletAddress};
use tracing::debug;

use crate::error::{InvalidActionError, LedgerError};

/// The active ballot of `ballot_type` for one (voter, delegate) pair.
fn active_pair(
    ballot_type: BallotType,
    voter: &WalletAddress,
    delegate: &WalletAddress,
) -> BallotFilter {
    BallotFilter::new()
        .ballot_type(ballot_type)
        .voter(voter)
        .delegate(delegate)
        .active(true)
}

/// Vote/unvote bookkeeping over the ballot table.
pub struct BallotLedger<S> {
    store: Arc<S>,
}

impl<S: Store> BallotLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Record a vote ballot for `(voter, delegate)`.
    ///
    /// Replaying an existing `id` re-applies the row and succeeds without
    /// re-validating. A fresh id fails with
    /// [`InvalidActionError::VoterAlreadyVoted`] if the pair already has an
    /// active vote, and otherwise deactivates any active unvote before the
    /// new ballot is written.
    pub async fn vote(
        &self,
        id: BallotId,
        voter: &WalletAddress,
        delegate: &WalletAddress,
    ) -> Result<(), LedgerError> {
        let ballots = self.store.ballots();
        if !ballots.ballot_exists(&id).await? {
            if ballots
                .any_ballot(&active_pair(BallotType::Vote, voter, delegate))
                .await?
            {
                return Err(InvalidActionError::VoterAlreadyVoted {
                    voter: voter.clone(),
                    delegate: delegate.clone(),
                }
                .into());
            }
            ballots
                .deactivate_ballots(&active_pair(BallotType::Unvote, voter, delegate))
                .await?;
        }
        debug!(%voter, %delegate, "recording vote ballot");
        ballots
            .upsert_ballot(&Ballot {
                id,
                ballot_type: BallotType::Vote,
                voter_address: voter.clone(),
                delegate_address: delegate.clone(),
                active: true,
            })
            .await?;
        Ok(())
    }

    /// Record an unvote ballot for `(voter, delegate)`.
    ///
    /// Replaying an existing `id` re-applies the row and succeeds. A fresh
    /// id fails with [`InvalidActionError::VoterNotVoting`] unless the pair
    /// currently has an active vote and no active unvote; the active vote is
    /// deactivated before the new ballot is written.
    pub async fn unvote(
        &self,
        id: BallotId,
        voter: &WalletAddress,
        delegate: &WalletAddress,
    ) -> Result<(), LedgerError> {
        let ballots = self.store.ballots();
        if !ballots.ballot_exists(&id).await? {
            let has_active_vote = ballots
                .any_ballot(&active_pair(BallotType::Vote, voter, delegate))
                .await?;
            let has_active_unvote = ballots
                .any_ballot(&active_pair(BallotType::Unvote, voter, delegate))
                .await?;
            if !has_active_vote || has_active_unvote {
                return Err(InvalidActionError::VoterNotVoting {
                    voter: voter.clone(),
                    delegate: delegate.clone(),
                }
                .into());
            }
            ballots
                .deactivate_ballots(&active_pair(BallotType::Vote, voter, delegate))
                .await?;
        }
        debug!(%voter, %delegate, "recording unvote ballot");
        ballots
            .upsert_ballot(&Ballot {
                id,
                ballot_type: BallotType::Unvote,
                voter_address: voter.clone(),
                delegate_address: delegate.clone(),
                active: true,
            })
            .await?;
        Ok(())
    }

    /// Delegate addresses the voter currently has an active vote for.
    ///
    /// Fails with [`InvalidActionError::AccountNotFound`] when no account
    /// exists at `voter`.
    pub async fn account_votes(
        &self,
        voter: &WalletAddress,
    ) -> Result<Vec<WalletAddress>, LedgerError> {
        if !self.store.accounts().account_exists(voter).await? {
            return Err(InvalidActionError::AccountNotFound(voter.clone()).into());
        }
        let filter = BallotFilter::new()
            .ballot_type(BallotType::Vote)
            .voter(voter)
            .active(true);
        let ballots = self.store.ballots().find_ballots(&filter).await?;
        Ok(ballots
            .into_iter()
            .map(|ballot| ballot.delegate_address)
            .collect())
    }

    /// Whether `voter` currently has an active vote for `delegate`.
    pub async fn has_vote_for(
        &self,
        voter: &WalletAddress,
        delegate: &WalletAddress,
    ) -> Result<bool, LedgerError> {
        Ok(self
            .store
            .ballots()
            .any_ballot(&active_pair(BallotType::Vote, voter, delegate))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidepool_store::{Account, AccountStore};
    use tidepool_store_mem::MemStore;
    use tidepool_types::TokenAmount;

    fn ledger() -> BallotLedger<MemStore> {
        BallotLedger::new(Arc::new(MemStore::new()))
    }

    fn addr(raw: &str) -> WalletAddress {
        WalletAddress::new(raw)
    }

    #[tokio::test]
    async fn vote_then_retry_same_id_is_a_no_op() {
        let ledger = ledger();
        let (voter, delegate) = (addr("tdpl_v"), addr("tdpl_d"));

        ledger.vote(BallotId::new("b1"), &voter, &delegate).await.unwrap();
        // Same id again: no error, state unchanged.
        ledger.vote(BallotId::new("b1"), &voter, &delegate).await.unwrap();
        assert!(ledger.has_vote_for(&voter, &delegate).await.unwrap());
    }

    #[tokio::test]
    async fn second_vote_with_fresh_id_fails() {
        let ledger = ledger();
        let (voter, delegate) = (addr("tdpl_v"), addr("tdpl_d"));

        ledger.vote(BallotId::new("b1"), &voter, &delegate).await.unwrap();
        let err = ledger
            .vote(BallotId::new("b2"), &voter, &delegate)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAction(InvalidActionError::VoterAlreadyVoted { .. })
        ));
    }

    #[tokio::test]
    async fn vote_unvote_vote_cycles_cleanly() {
        let ledger = ledger();
        let (voter, delegate) = (addr("tdpl_v"), addr("tdpl_d"));

        ledger.vote(BallotId::new("b1"), &voter, &delegate).await.unwrap();
        ledger.unvote(BallotId::new("b2"), &voter, &delegate).await.unwrap();
        assert!(!ledger.has_vote_for(&voter, &delegate).await.unwrap());
        ledger.vote(BallotId::new("b3"), &voter, &delegate).await.unwrap();
        assert!(ledger.has_vote_for(&voter, &delegate).await.unwrap());
    }

    #[tokio::test]
    async fn unvote_without_active_vote_fails() {
        let ledger = ledger();
        let err = ledger
            .unvote(BallotId::new("b1"), &addr("tdpl_v"), &addr("tdpl_d"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAction(InvalidActionError::VoterNotVoting { .. })
        ));
    }

    #[tokio::test]
    async fn repeated_unvote_with_fresh_id_fails() {
        let ledger = ledger();
        let (voter, delegate) = (addr("tdpl_v"), addr("tdpl_d"));

        ledger.vote(BallotId::new("b1"), &voter, &delegate).await.unwrap();
        ledger.unvote(BallotId::new("b2"), &voter, &delegate).await.unwrap();
        let err = ledger
            .unvote(BallotId::new("b3"), &voter, &delegate)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAction(InvalidActionError::VoterNotVoting { .. })
        ));
    }

    #[tokio::test]
    async fn new_vote_supersedes_active_unvote() {
        let store = Arc::new(MemStore::new());
        let ledger = BallotLedger::new(Arc::clone(&store));
        let (voter, delegate) = (addr("tdpl_v"), addr("tdpl_d"));

        ledger.vote(BallotId::new("b1"), &voter, &delegate).await.unwrap();
        ledger.unvote(BallotId::new("b2"), &voter, &delegate).await.unwrap();
        ledger.vote(BallotId::new("b3"), &voter, &delegate).await.unwrap();

        // The unvote row survives but is inactive.
        use tidepool_store::BallotStore;
        let inactive_unvotes = store
            .find_ballots(
                &BallotFilter::new()
                    .ballot_type(BallotType::Unvote)
                    .voter(&voter)
                    .delegate(&delegate),
            )
            .await
            .unwrap();
        assert_eq!(inactive_unvotes.len(), 1);
        assert!(!inactive_unvotes[0].active);
    }

    #[tokio::test]
    async fn account_votes_lists_active_targets_only() {
        let store = Arc::new(MemStore::new());
        let ledger = BallotLedger::new(Arc::clone(&store));
        let voter = addr("tdpl_v");
        store
            .upsert_account(&Account::new(voter.clone(), TokenAmount::from_u64(10)))
            .await
            .unwrap();

        ledger.vote(BallotId::new("b1"), &voter, &addr("tdpl_d1")).await.unwrap();
        ledger.vote(BallotId::new("b2"), &voter, &addr("tdpl_d2")).await.unwrap();
        ledger.unvote(BallotId::new("b3"), &voter, &addr("tdpl_d2")).await.unwrap();

        let votes = ledger.account_votes(&voter).await.unwrap();
        assert_eq!(votes, vec![addr("tdpl_d1")]);
    }

    #[tokio::test]
    async fn account_votes_requires_the_account() {
        let ledger = ledger();
        let err = ledger.account_votes(&addr("tdpl_ghost")).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InvalidAction(InvalidActionError::AccountNotFound(_))
        ));
    }
}
