//! In-memory implementation of `BallotStore`.

use async_trait::async_trait;
use tidepool_store::{Ballot, BallotFilter, BallotStore, StoreError};
use tidepool_types::BallotId;

use crate::{lock, MemStore};

#[async_trait]
impl BallotStore for MemStore {
    async fn upsert_ballot(&self, ballot: &Ballot) -> Result<(), StoreError> {
        lock(&self.ballots)?.insert(ballot.id.as_str().to_owned(), ballot.clone());
        Ok(())
    }

    async fn ballot_exists(&self, id: &BallotId) -> Result<bool, StoreError> {
        Ok(lock(&self.ballots)?.contains_key(id.as_str()))
    }

    async fn find_ballots(&self, filter: &BallotFilter) -> Result<Vec<Ballot>, StoreError> {
        Ok(lock(&self.ballots)?
            .values()
            .filter(|ballot| filter.matches(ballot))
            .cloned()
            .collect())
    }

    async fn any_ballot(&self, filter: &BallotFilter) -> Result<bool, StoreError> {
        Ok(lock(&self.ballots)?
            .values()
            .any(|ballot| filter.matches(ballot)))
    }

    async fn deactivate_ballots(&self, filter: &BallotFilter) -> Result<u64, StoreError> {
        let mut touched = 0;
        for ballot in lock(&self.ballots)?.values_mut() {
            if filter.matches(ballot) {
                ballot.active = false;
                touched += 1;
            }
        }
        Ok(touched)
    }
}
