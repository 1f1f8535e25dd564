//! Order lifecycle types
//!
//! The order aggregate and its closed state machine. Transition legality is
//! decided by one central table (`OrderStatus::permits`), never by scattered
//! guards, so every illegal `(status, action)` pair is rejected uniformly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::OrderError;
use crate::ids::{AccountId, ListingId, OrderId, ReceiptId, StoreId};
use crate::token::PaymentToken;

/// Order status enum.
///
/// Happy path: `Requested → ShippingSet → Escrowed → Shipped → Released`.
/// `Released`, `Cancelled`, `Refunded`, and `DisputeResolved` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Buyer requested the order; listing units reserved.
    Requested,
    /// Seller set shipping fee and delivery estimate.
    ShippingSet,
    /// Buyer paid; funds held in the vault.
    Escrowed,
    /// Seller handed the goods to the carrier.
    Shipped,
    /// Buyer confirmed delivery; funds released to seller (terminal).
    Released,
    /// Cancelled before escrow by buyer or seller (terminal).
    Cancelled,
    /// Escrow returned to the buyer in full (terminal).
    Refunded,
    /// Frozen pending mediator action; prior status remembered.
    Disputed,
    /// Mediator split the escrow between the parties (terminal).
    DisputeResolved,
}

/// Actions that drive the order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderAction {
    SetShipping,
    ConfirmAndPay,
    MarkShipped,
    ConfirmDelivery,
    CancelBeforeEscrow,
    CancelAndRefund,
    OpenDispute,
    CancelDispute,
    ResolveDispute,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Released
                | OrderStatus::Cancelled
                | OrderStatus::Refunded
                | OrderStatus::DisputeResolved
        )
    }

    /// The full transition table. Any `(status, action)` pair not listed
    /// here is an `InvalidTransition`.
    pub fn permits(&self, action: OrderAction) -> bool {
        use OrderAction::*;
        matches!(
            (self, action),
            (OrderStatus::Requested, SetShipping)
                | (OrderStatus::Requested, CancelBeforeEscrow)
                | (OrderStatus::ShippingSet, ConfirmAndPay)
                | (OrderStatus::ShippingSet, CancelBeforeEscrow)
                | (OrderStatus::Escrowed, MarkShipped)
                | (OrderStatus::Escrowed, CancelAndRefund)
                | (OrderStatus::Escrowed, OpenDispute)
                | (OrderStatus::Shipped, ConfirmDelivery)
                | (OrderStatus::Shipped, OpenDispute)
                | (OrderStatus::Disputed, CancelDispute)
                | (OrderStatus::Disputed, ResolveDispute)
        )
    }

    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Requested => "REQUESTED",
            OrderStatus::ShippingSet => "SHIPPING_SET",
            OrderStatus::Escrowed => "ESCROWED",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Released => "RELEASED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
            OrderStatus::Disputed => "DISPUTED",
            OrderStatus::DisputeResolved => "DISPUTE_RESOLVED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl OrderAction {
    /// Stable wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::SetShipping => "SET_SHIPPING",
            OrderAction::ConfirmAndPay => "CONFIRM_AND_PAY",
            OrderAction::MarkShipped => "MARK_SHIPPED",
            OrderAction::ConfirmDelivery => "CONFIRM_DELIVERY",
            OrderAction::CancelBeforeEscrow => "CANCEL_BEFORE_ESCROW",
            OrderAction::CancelAndRefund => "CANCEL_AND_REFUND",
            OrderAction::OpenDispute => "OPEN_DISPUTE",
            OrderAction::CancelDispute => "CANCEL_DISPUTE",
            OrderAction::ResolveDispute => "RESOLVE_DISPUTE",
        }
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispute bookkeeping, present while (and after) an order is disputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeInfo {
    /// The party that opened the dispute; only they may cancel it.
    pub initiator: AccountId,
    /// Status to restore if the dispute is cancelled.
    pub previous_status: OrderStatus,
}

/// Proof-of-purchase receipt minted by the external issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub token_id: ReceiptId,
    pub uri: String,
}

/// Complete order structure.
///
/// `amount` is fixed at creation (`price × quantity`); `shipping_fee` is set
/// once by the seller. While `funds_escrowed` is true the vault holds exactly
/// `amount + shipping_fee` for this order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub listing_id: ListingId,
    pub store_id: StoreId,
    pub payment_token: PaymentToken,
    pub amount: Decimal,
    pub quantity: u64,
    pub shipping_fee: Decimal,
    pub estimated_delivery_days: u32,
    pub buyer_location: String,
    pub status: OrderStatus,
    pub funds_escrowed: bool,
    pub completed: bool,
    pub buyer_comment: String,
    pub rated: bool,
    pub dispute: Option<DisputeInfo>,
    pub receipt: Option<Receipt>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new requested order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: OrderId,
        buyer: AccountId,
        seller: AccountId,
        listing_id: ListingId,
        store_id: StoreId,
        payment_token: PaymentToken,
        amount: Decimal,
        quantity: u64,
        buyer_location: String,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            buyer,
            seller,
            listing_id,
            store_id,
            payment_token,
            amount,
            quantity,
            shipping_fee: Decimal::ZERO,
            estimated_delivery_days: 0,
            buyer_location,
            status: OrderStatus::Requested,
            funds_escrowed: false,
            completed: false,
            buyer_comment: String::new(),
            rated: false,
            dispute: None,
            receipt: None,
            created_at,
            updated_at: created_at,
        }
    }

    /// Total the buyer must deposit to fund escrow.
    pub fn escrow_total(&self) -> Decimal {
        self.amount + self.shipping_fee
    }

    /// Guard an action against the transition table.
    pub fn ensure_permits(&self, action: OrderAction) -> Result<(), OrderError> {
        if !self.status.permits(action) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                action,
            });
        }
        Ok(())
    }

    /// Advance the status, stamping the update time.
    pub fn advance(&mut self, to: OrderStatus, now: i64) {
        self.status = to;
        self.updated_at = now;
    }

    /// Freeze into dispute, remembering where to return.
    pub fn open_dispute(&mut self, initiator: AccountId, now: i64) {
        self.dispute = Some(DisputeInfo {
            initiator,
            previous_status: self.status,
        });
        self.advance(OrderStatus::Disputed, now);
    }

    /// Unwind a cancelled dispute, restoring the remembered status.
    ///
    /// Returns the restored status. Callers must have verified the order is
    /// currently disputed.
    pub fn cancel_dispute(&mut self, now: i64) -> OrderStatus {
        let previous = self
            .dispute
            .map(|d| d.previous_status)
            .unwrap_or(self.status);
        self.dispute = None;
        self.advance(previous, now);
        previous
    }

    /// The status escrow accounting should treat this order as having,
    /// looking through a dispute freeze.
    pub fn effective_status(&self) -> OrderStatus {
        match (self.status, self.dispute) {
            (OrderStatus::Disputed, Some(info)) => info.previous_status,
            _ => self.status,
        }
    }
}
