//! Order ledger: the core state machine
//!
//! Every order advances exclusively through the transitions listed in the
//! central table (`OrderStatus::permits`). Authorization is checked before
//! state legality, and all fallible work happens before the first mutation,
//! so a rejected call leaves the order, the listing, and the vault exactly
//! as they were. Orders are never deleted; terminal states are retained for
//! audit.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use escrow::gateway::TokenGateway;
use escrow::tokens::TokenApprovalRegistry;
use escrow::vault::EscrowVault;
use types::errors::{ListingError, OrderError, StoreError};
use types::fee::FeeSchedule;
use types::ids::{AccountId, IdSequence, ListingId, OrderId};
use types::order::{Order, OrderAction, OrderStatus, Receipt};

use crate::errors::MarketplaceError;
use crate::events::{
    DeliveryConfirmed, FundsEscrowed, MarketEvent, OrderCancelled, OrderRefunded, OrderRequested,
    OrderShipped, ShippingTermsSet,
};
use crate::listings::ListingRegistry;
use crate::receipts::ReceiptIssuer;
use crate::stores::StoreRegistry;

/// The order state machine and its aggregate store.
#[derive(Debug, Default)]
pub struct OrderLedger {
    orders: HashMap<OrderId, Order>,
    seq: IdSequence,
    /// Emitted events log (append-only)
    events: Vec<MarketEvent>,
}

impl OrderLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            seq: IdSequence::new(),
            events: Vec::new(),
        }
    }

    // ───────────────────────── Order creation ─────────────────────────

    /// Buyer requests an order against a listing.
    ///
    /// Reserves the quantity (decrementing the listing) and fixes
    /// `amount = price × quantity` at creation.
    pub fn create_order_request(
        &mut self,
        listings: &mut ListingRegistry,
        buyer: AccountId,
        listing_id: ListingId,
        quantity: u64,
        buyer_location: String,
        now: i64,
    ) -> Result<OrderId, MarketplaceError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity.into());
        }
        let listing = listings
            .get(listing_id)
            .ok_or(ListingError::NotFound { listing_id })?;
        let seller = listing.seller;
        let store_id = listing.store_id;
        let payment_token = listing.payment_token.clone();
        let amount = listing.price * Decimal::from(quantity);

        listings.reserve(listing_id, quantity)?;

        let id = OrderId::from_raw(self.seq.next_raw());
        let order = Order::new(
            id,
            buyer,
            seller,
            listing_id,
            store_id,
            payment_token,
            amount,
            quantity,
            buyer_location,
            now,
        );
        self.orders.insert(id, order);

        debug!(order_id = %id, %listing_id, quantity, %amount, "order requested");

        self.events.push(MarketEvent::OrderRequested(OrderRequested {
            order_id: id,
            buyer,
            seller,
            listing_id,
            quantity,
            amount,
        }));
        Ok(id)
    }

    // ───────────────────────── Happy path ─────────────────────────

    /// Seller sets the shipping fee and delivery estimate.
    pub fn seller_set_shipping(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        shipping_fee: Decimal,
        estimated_delivery_days: u32,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_mut(order_id)?;
        if order.seller != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        order.ensure_permits(OrderAction::SetShipping)?;
        if shipping_fee < Decimal::ZERO {
            return Err(OrderError::InvalidShippingFee.into());
        }

        let before = order.status;
        order.shipping_fee = shipping_fee;
        order.estimated_delivery_days = estimated_delivery_days;
        order.advance(OrderStatus::ShippingSet, now);
        let actor = order.seller;

        let event = MarketEvent::ShippingTermsSet(ShippingTermsSet {
            order_id,
            actor,
            shipping_fee,
            estimated_delivery_days,
            before,
            after: OrderStatus::ShippingSet,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Buyer funds escrow with exactly `amount + shipping_fee`.
    ///
    /// The vault validates the deposited value and pulls it through the
    /// gateway; order status and `funds_escrowed` move in the same step.
    #[allow(clippy::too_many_arguments)]
    pub fn buyer_confirm_and_pay(
        &mut self,
        vault: &mut EscrowVault,
        gateway: &mut dyn TokenGateway,
        tokens: &TokenApprovalRegistry,
        order_id: OrderId,
        caller: &AccountId,
        value: Decimal,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_ref(order_id)?;
        if order.buyer != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        order.ensure_permits(OrderAction::ConfirmAndPay)?;
        let buyer = order.buyer;
        let payment_token = order.payment_token.clone();
        let expected = order.escrow_total();
        let before = order.status;

        vault.deposit(gateway, tokens, order_id, buyer, payment_token, expected, value)?;

        let order = self.order_mut(order_id)?;
        order.funds_escrowed = true;
        order.advance(OrderStatus::Escrowed, now);

        let event = MarketEvent::FundsEscrowed(FundsEscrowed {
            order_id,
            actor: buyer,
            amount: expected,
            before,
            after: OrderStatus::Escrowed,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Seller marks the order as shipped.
    pub fn mark_shipped(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_mut(order_id)?;
        if order.seller != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        order.ensure_permits(OrderAction::MarkShipped)?;

        let before = order.status;
        order.advance(OrderStatus::Shipped, now);
        let actor = order.seller;

        let event = MarketEvent::OrderShipped(OrderShipped {
            order_id,
            actor,
            before,
            after: OrderStatus::Shipped,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    /// Buyer confirms delivery: escrow releases to the seller net of the
    /// fee, the store rating moves, and a receipt is minted best-effort.
    ///
    /// A receipt mint failure is logged and never rolls the release back.
    #[allow(clippy::too_many_arguments)]
    pub fn confirm_delivery(
        &mut self,
        vault: &mut EscrowVault,
        gateway: &mut dyn TokenGateway,
        stores: &mut StoreRegistry,
        receipts: &mut dyn ReceiptIssuer,
        fees: &FeeSchedule,
        collector: AccountId,
        order_id: OrderId,
        caller: &AccountId,
        positive: bool,
        comment: String,
        receipt_uri: String,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_ref(order_id)?;
        if order.buyer != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        if order.completed {
            return Err(OrderError::AlreadyCompleted.into());
        }
        if order.rated {
            return Err(OrderError::AlreadyRated.into());
        }
        order.ensure_permits(OrderAction::ConfirmDelivery)?;
        let buyer = order.buyer;
        let seller = order.seller;
        let store_id = order.store_id;
        let before = order.status;
        if stores.get(store_id).is_none() {
            return Err(StoreError::NotFound { store_id }.into());
        }

        let (seller_net, fee) = vault.release(gateway, order_id, seller, fees, collector)?;
        stores.record_rating(store_id, order_id, positive)?;

        let receipt = match receipts.issue(buyer, order_id, &receipt_uri) {
            Ok(token_id) => Some(Receipt {
                token_id,
                uri: receipt_uri,
            }),
            Err(err) => {
                warn!(%order_id, %err, "receipt mint failed; release stands, retry out-of-band");
                None
            }
        };

        let order = self.order_mut(order_id)?;
        order.buyer_comment = comment;
        order.rated = true;
        order.completed = true;
        order.funds_escrowed = false;
        order.receipt = receipt;
        order.advance(OrderStatus::Released, now);

        debug!(%order_id, %seller_net, %fee, "delivery confirmed");

        let event = MarketEvent::DeliveryConfirmed(DeliveryConfirmed {
            order_id,
            actor: buyer,
            seller_net,
            fee,
            positive,
            before,
            after: OrderStatus::Released,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Cancellation paths ─────────────────────────

    /// Buyer cancels before funding escrow.
    pub fn buyer_cancel_before_escrow(
        &mut self,
        listings: &mut ListingRegistry,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_ref(order_id)?;
        if order.buyer != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        let actor = order.buyer;
        self.cancel_pre_escrow(listings, order_id, actor, now)
    }

    /// Seller cancels before the buyer funds escrow.
    pub fn seller_cancel_order(
        &mut self,
        listings: &mut ListingRegistry,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_ref(order_id)?;
        if order.seller != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        let actor = order.seller;
        self.cancel_pre_escrow(listings, order_id, actor, now)
    }

    /// Buyer cancels a funded order; the vault refunds the full escrow and
    /// the reserved units return to the listing.
    pub fn buyer_cancel_and_refund(
        &mut self,
        vault: &mut EscrowVault,
        gateway: &mut dyn TokenGateway,
        listings: &mut ListingRegistry,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_ref(order_id)?;
        if order.buyer != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        order.ensure_permits(OrderAction::CancelAndRefund)?;
        let buyer = order.buyer;
        let listing_id = order.listing_id;
        let quantity = order.quantity;
        let before = order.status;

        let amount = vault.refund(gateway, order_id)?;
        listings.restore(listing_id, quantity)?;

        let order = self.order_mut(order_id)?;
        order.funds_escrowed = false;
        order.advance(OrderStatus::Refunded, now);

        debug!(%order_id, %amount, "order refunded");

        let event = MarketEvent::OrderRefunded(OrderRefunded {
            order_id,
            actor: buyer,
            amount,
            before,
            after: OrderStatus::Refunded,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    fn cancel_pre_escrow(
        &mut self,
        listings: &mut ListingRegistry,
        order_id: OrderId,
        actor: AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = self.order_ref(order_id)?;
        order.ensure_permits(OrderAction::CancelBeforeEscrow)?;
        let listing_id = order.listing_id;
        let quantity = order.quantity;
        let before = order.status;

        listings.restore(listing_id, quantity)?;

        let order = self.order_mut(order_id)?;
        order.advance(OrderStatus::Cancelled, now);

        let event = MarketEvent::OrderCancelled(OrderCancelled {
            order_id,
            actor,
            restored_quantity: quantity,
            before,
            after: OrderStatus::Cancelled,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Look up an order by id.
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    /// All orders placed by a buyer.
    pub fn orders_by_buyer(&self, buyer: &AccountId) -> Vec<&Order> {
        let mut found: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| order.buyer == *buyer)
            .collect();
        found.sort_by_key(|order| order.id);
        found
    }

    /// All orders addressed to a seller.
    pub fn orders_by_seller(&self, seller: &AccountId) -> Vec<&Order> {
        let mut found: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| order.seller == *seller)
            .collect();
        found.sort_by_key(|order| order.id);
        found
    }

    /// Iterate over every order, for audits.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Number of orders ever created.
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get all emitted events.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    pub(crate) fn order_ref(&self, order_id: OrderId) -> Result<&Order, OrderError> {
        self.orders
            .get(&order_id)
            .ok_or(OrderError::NotFound { order_id })
    }

    pub(crate) fn order_mut(&mut self, order_id: OrderId) -> Result<&mut Order, OrderError> {
        self.orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound { order_id })
    }

    pub(crate) fn push_event(&mut self, event: MarketEvent) {
        self.events.push(event);
    }
}
