//! Payment token identifiers
//!
//! A listing is priced in exactly one payment asset: either the native coin
//! or an approved fungible token identified by its symbol. Symbols are opaque
//! to the core.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment asset for a listing and its orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "symbol", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentToken {
    /// The native coin; always accepted, deposited as attached value.
    Native,
    /// A fungible token, pulled via the allowance two-step.
    Token(String),
}

impl PaymentToken {
    /// Create a token variant from a symbol.
    pub fn token(symbol: impl Into<String>) -> Self {
        Self::Token(symbol.into())
    }

    /// Whether this is the native coin.
    pub fn is_native(&self) -> bool {
        matches!(self, PaymentToken::Native)
    }
}

impl fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentToken::Native => write!(f, "native"),
            PaymentToken::Token(symbol) => write!(f, "{symbol}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_display() {
        assert_eq!(PaymentToken::Native.to_string(), "native");
    }

    #[test]
    fn test_token_display() {
        assert_eq!(PaymentToken::token("USDT").to_string(), "USDT");
    }

    #[test]
    fn test_is_native() {
        assert!(PaymentToken::Native.is_native());
        assert!(!PaymentToken::token("USDC").is_native());
    }

    #[test]
    fn test_serialization_round_trip() {
        let token = PaymentToken::token("DAI");
        let json = serde_json::to_string(&token).unwrap();
        let deserialized: PaymentToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, deserialized);
    }
}
