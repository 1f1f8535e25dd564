//! Settlement events
//!
//! Immutable records emitted by vault operations. Consumers (UI, analytics)
//! read these off the append-only log; emission never blocks on them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use types::ids::{AccountId, OrderId};
use types::token::PaymentToken;

/// Funds deposited into escrow for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub order_id: OrderId,
    pub payer: AccountId,
    pub token: PaymentToken,
    pub amount: Decimal,
}

/// Escrow released to the seller, net of the marketplace fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Released {
    pub order_id: OrderId,
    pub seller: AccountId,
    pub seller_net: Decimal,
    pub fee: Decimal,
}

/// Escrow refunded to the buyer in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refunded {
    pub order_id: OrderId,
    pub buyer: AccountId,
    pub amount: Decimal,
}

/// Escrow split between the parties by dispute resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSettled {
    pub order_id: OrderId,
    pub to_buyer: Decimal,
    pub to_seller: Decimal,
    /// Unallocated remainder paid to the fee collector.
    pub residual: Decimal,
}

/// Enum wrapper for all settlement events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowEvent {
    Deposited(Deposited),
    Released(Released),
    Refunded(Refunded),
    SplitSettled(SplitSettled),
}
