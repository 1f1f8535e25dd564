//! Custody-specific error types
//!
//! Error taxonomy for the token gateway, approval registry, and escrow vault.

use rust_decimal::Decimal;
use thiserror::Error;

use types::ids::OrderId;

/// Token gateway errors (fungible-token collaborator)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Insufficient balance for {token}: required {required}, available {available}")]
    InsufficientBalance {
        token: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Insufficient allowance for {token}: required {required}, granted {granted}")]
    InsufficientAllowance {
        token: String,
        required: Decimal,
        granted: Decimal,
    },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Vault-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error("Wrong deposit amount: expected {expected}, got {actual}")]
    WrongAmount { expected: Decimal, actual: Decimal },

    #[error("Token not approved: {token}")]
    TokenNotApproved { token: String },

    #[error("Over-allocation: requested {requested} exceeds escrowed {available}")]
    OverAllocation {
        requested: Decimal,
        available: Decimal,
    },

    #[error("No escrow held for order {order_id}")]
    NoEscrow { order_id: OrderId },

    #[error("Order {order_id} is already funded")]
    AlreadyFunded { order_id: OrderId },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Payout leg must not be negative")]
    NegativeLeg,

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::InsufficientAllowance {
            token: "USDT".to_string(),
            required: Decimal::from(21),
            granted: Decimal::from(20),
        };
        assert!(err.to_string().contains("USDT"));
        assert!(err.to_string().contains("21"));
    }

    #[test]
    fn test_vault_error_display() {
        let err = VaultError::WrongAmount {
            expected: Decimal::from(21),
            actual: Decimal::from(20),
        };
        assert_eq!(err.to_string(), "Wrong deposit amount: expected 21, got 20");
    }

    #[test]
    fn test_vault_error_from_gateway() {
        let gw_err = GatewayError::Overflow;
        let vault_err: VaultError = gw_err.into();
        assert!(matches!(vault_err, VaultError::Gateway(_)));
    }
}
