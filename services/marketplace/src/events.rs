//! Marketplace events
//!
//! Every state-changing call emits one structured event carrying the actor,
//! the affected ids, before/after status where applicable, and the amounts
//! that moved. Events accumulate on append-only logs owned by the emitting
//! component; off-process consumers (UI, analytics, chat, insight engines)
//! drain them and never block the core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use types::ids::{AccountId, ListingId, OrderId, StoreId};
use types::order::OrderStatus;
use types::token::PaymentToken;

// ───────────────────────── Listing events ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCreated {
    pub listing_id: ListingId,
    pub seller: AccountId,
    pub store_id: StoreId,
    pub payment_token: PaymentToken,
    pub price: Decimal,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingUpdated {
    pub listing_id: ListingId,
    pub price: Decimal,
    pub active: bool,
    pub initial_quantity: u64,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingActivationChanged {
    pub listing_id: ListingId,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCancelled {
    pub listing_id: ListingId,
}

// ───────────────────────── Store events ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCreated {
    pub store_id: StoreId,
    pub owner: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreUpdated {
    pub store_id: StoreId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRated {
    pub store_id: StoreId,
    pub order_id: OrderId,
    pub positive: bool,
}

// ───────────────────────── Order events ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequested {
    pub order_id: OrderId,
    pub buyer: AccountId,
    pub seller: AccountId,
    pub listing_id: ListingId,
    pub quantity: u64,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingTermsSet {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub shipping_fee: Decimal,
    pub estimated_delivery_days: u32,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsEscrowed {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub amount: Decimal,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderShipped {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryConfirmed {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub seller_net: Decimal,
    pub fee: Decimal,
    pub positive: bool,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub restored_quantity: u64,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRefunded {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub amount: Decimal,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

// ───────────────────────── Dispute events ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeOpened {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeCancelled {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeResolved {
    pub order_id: OrderId,
    pub actor: AccountId,
    pub refund_to_buyer: Decimal,
    pub payout_to_seller: Decimal,
    pub residual: Decimal,
    pub before: OrderStatus,
    pub after: OrderStatus,
}

// ───────────────────────── Admin events ─────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenApprovalChanged {
    pub token: String,
    pub approved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeesChanged {
    pub fee_bps: u32,
    pub collector: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatorChanged {
    pub mediator: AccountId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseChanged {
    pub paused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerTransferred {
    pub new_owner: AccountId,
}

/// Enum wrapper for all marketplace events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketEvent {
    ListingCreated(ListingCreated),
    ListingUpdated(ListingUpdated),
    ListingActivationChanged(ListingActivationChanged),
    ListingCancelled(ListingCancelled),
    StoreCreated(StoreCreated),
    StoreUpdated(StoreUpdated),
    StoreRated(StoreRated),
    OrderRequested(OrderRequested),
    ShippingTermsSet(ShippingTermsSet),
    FundsEscrowed(FundsEscrowed),
    OrderShipped(OrderShipped),
    DeliveryConfirmed(DeliveryConfirmed),
    OrderCancelled(OrderCancelled),
    OrderRefunded(OrderRefunded),
    DisputeOpened(DisputeOpened),
    DisputeCancelled(DisputeCancelled),
    DisputeResolved(DisputeResolved),
    TokenApprovalChanged(TokenApprovalChanged),
    FeesChanged(FeesChanged),
    MediatorChanged(MediatorChanged),
    PauseChanged(PauseChanged),
    OwnerTransferred(OwnerTransferred),
}
