//! Wallet address type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A wallet address on the Tidepool network.
///
/// Addresses arrive pre-validated from the signature layer, so this type
/// only provides map-key semantics and cheap cloning, not well-formedness
/// checks.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}
