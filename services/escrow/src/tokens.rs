//! Approved payment token registry
//!
//! Tracks which fungible tokens the marketplace accepts. The native coin is
//! always accepted. Approval is owner-gated at the admin surface; revoking a
//! token only affects new listings and deposits, never funds already held.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use types::token::PaymentToken;

/// Registry of approved payment tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenApprovalRegistry {
    approved: HashSet<String>,
}

impl TokenApprovalRegistry {
    /// Create an empty registry (native-only).
    pub fn new() -> Self {
        Self {
            approved: HashSet::new(),
        }
    }

    /// Approve or revoke a token symbol. Returns the previous approval state.
    pub fn set_approved(&mut self, symbol: impl Into<String>, approved: bool) -> bool {
        let symbol = symbol.into();
        if approved {
            !self.approved.insert(symbol)
        } else {
            self.approved.remove(&symbol)
        }
    }

    /// Check if a payment token is accepted. `Native` always is.
    pub fn is_approved(&self, token: &PaymentToken) -> bool {
        match token {
            PaymentToken::Native => true,
            PaymentToken::Token(symbol) => self.approved.contains(symbol),
        }
    }

    /// Number of approved token symbols (excluding native).
    pub fn len(&self) -> usize {
        self.approved.len()
    }

    /// Whether any token symbols are approved.
    pub fn is_empty(&self) -> bool {
        self.approved.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_always_approved() {
        let registry = TokenApprovalRegistry::new();
        assert!(registry.is_approved(&PaymentToken::Native));
    }

    #[test]
    fn test_approve_and_check() {
        let mut registry = TokenApprovalRegistry::new();
        registry.set_approved("USDT", true);
        assert!(registry.is_approved(&PaymentToken::token("USDT")));
        assert!(!registry.is_approved(&PaymentToken::token("SHIB")));
    }

    #[test]
    fn test_revoke() {
        let mut registry = TokenApprovalRegistry::new();
        registry.set_approved("USDT", true);
        registry.set_approved("USDT", false);
        assert!(!registry.is_approved(&PaymentToken::token("USDT")));
    }

    #[test]
    fn test_set_approved_reports_previous_state() {
        let mut registry = TokenApprovalRegistry::new();
        assert!(!registry.set_approved("DAI", true));
        assert!(registry.set_approved("DAI", true));
        assert!(registry.set_approved("DAI", false));
        assert!(!registry.set_approved("DAI", false));
    }
}
