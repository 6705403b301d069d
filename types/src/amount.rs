//! Arbitrary-precision token amounts.
//!
//! Balances and vote weights are decimal text in storage and 256-bit
//! unsigned integers in memory. Floating point never touches an amount.

use primitive_types::U256;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raised when a decimal-text amount cannot be parsed.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid decimal amount: {0:?}")]
pub struct AmountParseError(pub String);

/// A token amount (balance, fee, vote weight).
///
/// Serializes as a decimal string so that storage backends hold amounts as
/// text and never lose precision to a float or a narrow integer column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn from_u64(raw: u64) -> Self {
        Self(U256::from(raw))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl FromStr for TokenAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_dec_str(s)
            .map(Self)
            .map_err(|_| AmountParseError(s.to_owned()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // U256 renders in base ten.
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct TokenAmountVisitor;

impl Visitor<'_> for TokenAmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal string or unsigned integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(de::Error::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TokenAmount::from_u64(v))
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenAmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_decimal_text() {
        let amount: TokenAmount = "340282366920938463463374607431768211456".parse().unwrap();
        assert_eq!(
            amount.to_string(),
            "340282366920938463463374607431768211456"
        );
    }

    #[test]
    fn rejects_non_numeric_input() {
        assert!("12.5".parse::<TokenAmount>().is_err());
        assert!("".parse::<TokenAmount>().is_err());
        assert!("1e10".parse::<TokenAmount>().is_err());
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let nine: TokenAmount = "9".parse().unwrap();
        let eighty: TokenAmount = "80".parse().unwrap();
        assert!(nine < eighty);
    }

    #[test]
    fn serde_round_trips_as_string() {
        let amount: TokenAmount = "1000000000000000000000000".parse().unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"1000000000000000000000000\"");
        let back: TokenAmount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn deserializes_bare_integers() {
        let amount: TokenAmount = serde_json::from_str("42").unwrap();
        assert_eq!(amount, TokenAmount::from_u64(42));
    }

    #[test]
    fn checked_add_accumulates() {
        let a = TokenAmount::from_u64(100);
        let b = TokenAmount::from_u64(23);
        assert_eq!(a.checked_add(b).unwrap(), TokenAmount::from_u64(123));
    }
}
