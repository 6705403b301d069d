//! Account classification.

use serde::{Deserialize, Serialize};

/// How an account authorizes actions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// A plain single-signature account.
    #[default]
    Sig,
    /// A wallet requiring a threshold of member signatures.
    Multisig,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sig => "sig",
            Self::Multisig => "multisig",
        }
    }

    pub fn is_multisig(&self) -> bool {
        matches!(self, Self::Multisig)
    }
}
