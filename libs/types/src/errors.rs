//! Error taxonomy for the marketplace core
//!
//! Comprehensive error types using thiserror. Every rejected operation leaves
//! all aggregates unchanged; errors carry the offending field values so
//! callers can retry with corrected input.

use thiserror::Error;

use crate::ids::{ListingId, OrderId, StoreId};
use crate::order::{OrderAction, OrderStatus};

/// Listing registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ListingError {
    #[error("Listing not found: {listing_id}")]
    NotFound { listing_id: ListingId },

    #[error("Unauthorized: caller is not the listing seller")]
    Unauthorized,

    #[error("Price must be positive")]
    InvalidPrice,

    #[error("Quantity must be positive")]
    InvalidQuantity,

    #[error("Out of stock: requested {requested}, available {available}")]
    OutOfStock { requested: u64, available: u64 },

    #[error("Listing has been cancelled")]
    Tombstoned,

    #[error("Listing has reserved sales: {sold} unit(s)")]
    HasSales { sold: u64 },

    #[error("Stock cap {cap} is below units already sold ({sold})")]
    CapBelowSold { cap: u64, sold: u64 },

    #[error("Restore would exceed initial quantity: quantity {quantity} + restored {restored} > cap {cap}")]
    RestoreOverflow {
        quantity: u64,
        restored: u64,
        cap: u64,
    },
}

/// Store registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Store not found: {store_id}")]
    NotFound { store_id: StoreId },

    #[error("Identity already owns a store: {store_id}")]
    AlreadyExists { store_id: StoreId },

    #[error("Unauthorized: caller is not the store owner")]
    Unauthorized,
}

/// Order ledger errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("Order not found: {order_id}")]
    NotFound { order_id: OrderId },

    #[error("Unauthorized: caller lacks the required role for this action")]
    Unauthorized,

    #[error("Action {action} not allowed from status {from}")]
    InvalidTransition {
        from: OrderStatus,
        action: OrderAction,
    },

    #[error("Order already completed")]
    AlreadyCompleted,

    #[error("Order already rated")]
    AlreadyRated,

    #[error("Order quantity must be positive")]
    InvalidQuantity,

    #[error("Shipping fee must not be negative")]
    InvalidShippingFee,
}

/// Fee configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeeError {
    #[error("Fee basis points out of range: {bps} (max {max})")]
    BpsOutOfRange { bps: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_error_display() {
        let err = ListingError::OutOfStock {
            requested: 7,
            available: 3,
        };
        assert_eq!(err.to_string(), "Out of stock: requested 7, available 3");
    }

    #[test]
    fn test_order_error_transition_display() {
        let err = OrderError::InvalidTransition {
            from: OrderStatus::Requested,
            action: OrderAction::MarkShipped,
        };
        assert!(err.to_string().contains("MARK_SHIPPED"));
        assert!(err.to_string().contains("REQUESTED"));
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound {
            store_id: StoreId::from_raw(9),
        };
        assert!(err.to_string().contains('9'));
    }

    #[test]
    fn test_fee_error_display() {
        let err = FeeError::BpsOutOfRange {
            bps: 10_001,
            max: 10_000,
        };
        assert!(err.to_string().contains("10001"));
    }
}
