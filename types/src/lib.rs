//! Core scalar types shared across the Tidepool ledger crates.
//!
//! Everything here is a thin newtype over a primitive: addresses and record
//! ids wrap strings, timestamps wrap epoch milliseconds, and token amounts
//! wrap 256-bit unsigned integers that cross the storage boundary as decimal
//! text.

pub mod account;
pub mod address;
pub mod amount;
pub mod ids;
pub mod time;

pub use account::AccountType;
pub use address::WalletAddress;
pub use amount::{AmountParseError, TokenAmount};
pub use ids::{BallotId, BlockId, TransactionId};
pub use time::Timestamp;
