//! Marketplace facade
//!
//! Wires the registries, the order ledger, the dispute arbiter, and the
//! escrow vault behind one exclusive-access boundary (`&mut self`), which is
//! what serializes operations per aggregate. External collaborators (the
//! token gateway and the receipt issuer) are passed into the operations
//! that need them, never owned.
//!
//! The admin surface (token approval, fees, mediator, pause, ownership) is
//! owner-gated and takes effect on subsequent operations only.

use rust_decimal::Decimal;
use tracing::info;

use escrow::events::EscrowEvent;
use escrow::gateway::TokenGateway;
use escrow::security::{AccessControl, PauseGuard};
use escrow::tokens::TokenApprovalRegistry;
use escrow::vault::EscrowVault;
use types::ids::{AccountId, ListingId, OrderId, StoreId};
use types::listing::{Listing, ListingMetadata};
use types::order::Order;
use types::store::{Store, StoreProfile};
use types::token::PaymentToken;

use crate::config::MarketConfig;
use crate::disputes::DisputeArbiter;
use crate::errors::MarketplaceError;
use crate::events::{
    FeesChanged, MarketEvent, MediatorChanged, OwnerTransferred, PauseChanged,
    TokenApprovalChanged,
};
use crate::ledger::OrderLedger;
use crate::listings::ListingRegistry;
use crate::receipts::ReceiptIssuer;
use crate::stores::StoreRegistry;

/// The marketplace core behind a single writer.
#[derive(Debug)]
pub struct Marketplace {
    access: AccessControl,
    pause: PauseGuard,
    tokens: TokenApprovalRegistry,
    config: MarketConfig,
    listings: ListingRegistry,
    stores: StoreRegistry,
    ledger: OrderLedger,
    arbiter: DisputeArbiter,
    vault: EscrowVault,
    /// Admin events log (append-only)
    admin_events: Vec<MarketEvent>,
}

impl Marketplace {
    /// Create a marketplace with an owner, a mediator, and a fee schedule.
    pub fn new(
        owner: AccountId,
        mediator: AccountId,
        fee_bps: u32,
        fee_collector: AccountId,
    ) -> Result<Self, MarketplaceError> {
        Ok(Self {
            access: AccessControl::new(owner),
            pause: PauseGuard::new(),
            tokens: TokenApprovalRegistry::new(),
            config: MarketConfig::new(fee_bps, fee_collector, mediator)?,
            listings: ListingRegistry::new(),
            stores: StoreRegistry::new(),
            ledger: OrderLedger::new(),
            arbiter: DisputeArbiter::new(),
            vault: EscrowVault::new(),
            admin_events: Vec::new(),
        })
    }

    // ───────────────────────── Admin surface ─────────────────────────

    /// Approve or revoke a payment token. Owner only.
    pub fn approve_token(
        &mut self,
        caller: &AccountId,
        symbol: impl Into<String>,
        approved: bool,
    ) -> Result<(), MarketplaceError> {
        self.ensure_owner(caller)?;
        let symbol = symbol.into();
        self.tokens.set_approved(symbol.clone(), approved);
        info!(token = %symbol, approved, "token approval changed");
        self.admin_events
            .push(MarketEvent::TokenApprovalChanged(TokenApprovalChanged {
                token: symbol,
                approved,
            }));
        Ok(())
    }

    /// Replace the fee schedule and collector. Owner only; applies to
    /// settlements performed after the change.
    pub fn set_fees(
        &mut self,
        caller: &AccountId,
        fee_bps: u32,
        collector: AccountId,
    ) -> Result<(), MarketplaceError> {
        self.ensure_owner(caller)?;
        self.config.set_fees(fee_bps, collector)?;
        info!(fee_bps, "fee schedule changed");
        self.admin_events.push(MarketEvent::FeesChanged(FeesChanged {
            fee_bps,
            collector,
        }));
        Ok(())
    }

    /// Replace the mediator. Owner only; applies to resolutions performed
    /// after the change.
    pub fn set_mediator(
        &mut self,
        caller: &AccountId,
        mediator: AccountId,
    ) -> Result<(), MarketplaceError> {
        self.ensure_owner(caller)?;
        self.config.set_mediator(mediator);
        info!(%mediator, "mediator changed");
        self.admin_events
            .push(MarketEvent::MediatorChanged(MediatorChanged { mediator }));
        Ok(())
    }

    /// Halt all state-changing market operations. Owner only.
    pub fn pause(&mut self, caller: &AccountId) -> Result<(), MarketplaceError> {
        self.ensure_owner(caller)?;
        self.pause.pause();
        self.admin_events
            .push(MarketEvent::PauseChanged(PauseChanged { paused: true }));
        Ok(())
    }

    /// Resume market operations. Owner only.
    pub fn unpause(&mut self, caller: &AccountId) -> Result<(), MarketplaceError> {
        self.ensure_owner(caller)?;
        self.pause.unpause();
        self.admin_events
            .push(MarketEvent::PauseChanged(PauseChanged { paused: false }));
        Ok(())
    }

    /// Hand the owner role to a successor. Owner only.
    pub fn transfer_owner(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), MarketplaceError> {
        if !self.access.transfer_owner(caller, new_owner) {
            return Err(MarketplaceError::Unauthorized);
        }
        self.admin_events
            .push(MarketEvent::OwnerTransferred(OwnerTransferred { new_owner }));
        Ok(())
    }

    // ───────────────────────── Stores ─────────────────────────

    /// Open a store for an identity. One store per identity.
    pub fn create_store(
        &mut self,
        owner: AccountId,
        profile: StoreProfile,
        now: i64,
    ) -> Result<StoreId, MarketplaceError> {
        self.ensure_not_paused()?;
        Ok(self.stores.create_store(owner, profile, now)?)
    }

    /// Replace a storefront profile. Store owner only.
    pub fn update_store(
        &mut self,
        store_id: StoreId,
        caller: &AccountId,
        profile: StoreProfile,
    ) -> Result<(), MarketplaceError> {
        self.ensure_not_paused()?;
        Ok(self.stores.update_store(store_id, caller, profile)?)
    }

    // ───────────────────────── Listings ─────────────────────────

    /// Create a listing. Requires an approved payment token and ownership of
    /// the target store.
    #[allow(clippy::too_many_arguments)]
    pub fn create_listing(
        &mut self,
        seller: AccountId,
        payment_token: PaymentToken,
        price: Decimal,
        metadata: ListingMetadata,
        quantity: u64,
        store_id: StoreId,
        now: i64,
    ) -> Result<ListingId, MarketplaceError> {
        self.ensure_not_paused()?;
        self.listings.create_listing(
            &self.tokens,
            &self.stores,
            seller,
            payment_token,
            price,
            metadata,
            quantity,
            store_id,
            now,
        )
    }

    /// Seller update: price, active flag, and stock cap (sold units kept).
    pub fn update_listing(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
        new_price: Decimal,
        active: bool,
        new_initial_quantity: u64,
    ) -> Result<(), MarketplaceError> {
        self.ensure_not_paused()?;
        self.listings
            .update_listing(listing_id, caller, new_price, active, new_initial_quantity)
    }

    /// Stop accepting orders against a listing. Seller only.
    pub fn deactivate_listing(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        self.ensure_not_paused()?;
        self.listings.deactivate_listing(listing_id, caller)
    }

    /// Resume accepting orders against a listing. Seller only.
    pub fn reactivate_listing(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        self.ensure_not_paused()?;
        self.listings.reactivate_listing(listing_id, caller)
    }

    /// Irreversibly cancel a listing with zero units ever reserved.
    pub fn cancel_listing_if_no_sales(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        self.ensure_not_paused()?;
        self.listings.cancel_listing_if_no_sales(listing_id, caller)
    }

    // ───────────────────────── Orders ─────────────────────────

    /// Buyer requests an order; reserves listing quantity.
    pub fn create_order_request(
        &mut self,
        buyer: AccountId,
        listing_id: ListingId,
        quantity: u64,
        buyer_location: String,
        now: i64,
    ) -> Result<OrderId, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger
            .create_order_request(&mut self.listings, buyer, listing_id, quantity, buyer_location, now)
    }

    /// Seller sets shipping fee and delivery estimate.
    pub fn seller_set_shipping(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        shipping_fee: Decimal,
        estimated_delivery_days: u32,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger
            .seller_set_shipping(order_id, caller, shipping_fee, estimated_delivery_days, now)
    }

    /// Buyer funds escrow with exactly `amount + shipping_fee`.
    pub fn buyer_confirm_and_pay(
        &mut self,
        gateway: &mut dyn TokenGateway,
        order_id: OrderId,
        caller: &AccountId,
        value: Decimal,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger.buyer_confirm_and_pay(
            &mut self.vault,
            gateway,
            &self.tokens,
            order_id,
            caller,
            value,
            now,
        )
    }

    /// Seller marks the order shipped.
    pub fn mark_shipped(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger.mark_shipped(order_id, caller, now)
    }

    /// Buyer confirms delivery; escrow releases net of fee, the store is
    /// rated, and a receipt is minted best-effort.
    #[allow(clippy::too_many_arguments)]
    pub fn confirm_delivery(
        &mut self,
        gateway: &mut dyn TokenGateway,
        receipts: &mut dyn ReceiptIssuer,
        order_id: OrderId,
        caller: &AccountId,
        positive: bool,
        comment: String,
        receipt_uri: String,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger.confirm_delivery(
            &mut self.vault,
            gateway,
            &mut self.stores,
            receipts,
            self.config.fees(),
            self.config.fee_collector(),
            order_id,
            caller,
            positive,
            comment,
            receipt_uri,
            now,
        )
    }

    /// Buyer cancels before funding escrow.
    pub fn buyer_cancel_before_escrow(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger
            .buyer_cancel_before_escrow(&mut self.listings, order_id, caller, now)
    }

    /// Seller cancels before the buyer funds escrow.
    pub fn seller_cancel_order(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger
            .seller_cancel_order(&mut self.listings, order_id, caller, now)
    }

    /// Buyer cancels a funded order for a full refund.
    pub fn buyer_cancel_and_refund(
        &mut self,
        gateway: &mut dyn TokenGateway,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.ledger.buyer_cancel_and_refund(
            &mut self.vault,
            gateway,
            &mut self.listings,
            order_id,
            caller,
            now,
        )
    }

    // ───────────────────────── Disputes ─────────────────────────

    /// Buyer or seller freezes a funded order into dispute.
    pub fn open_dispute(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.arbiter
            .open_dispute(&mut self.ledger, order_id, caller, now)
    }

    /// The dispute initiator withdraws it.
    pub fn cancel_dispute(
        &mut self,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.arbiter
            .cancel_dispute(&mut self.ledger, order_id, caller, now)
    }

    /// The mediator splits the escrow between the parties.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_dispute(
        &mut self,
        gateway: &mut dyn TokenGateway,
        receipts: &mut dyn ReceiptIssuer,
        order_id: OrderId,
        caller: &AccountId,
        refund_to_buyer: Decimal,
        payout_to_seller: Decimal,
        receipt_uri: String,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        self.ensure_not_paused()?;
        self.arbiter.resolve_dispute(
            &mut self.ledger,
            &mut self.vault,
            gateway,
            receipts,
            &self.config,
            order_id,
            caller,
            refund_to_buyer,
            payout_to_seller,
            receipt_uri,
            now,
        )
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn listing(&self, listing_id: ListingId) -> Option<&Listing> {
        self.listings.get(listing_id)
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.ledger.get(order_id)
    }

    pub fn store(&self, store_id: StoreId) -> Option<&Store> {
        self.stores.get(store_id)
    }

    pub fn store_of(&self, owner: &AccountId) -> Option<&Store> {
        self.stores.store_of_owner(owner)
    }

    /// Escrow held for an order; zero once settled or never funded.
    pub fn escrow_balance(&self, order_id: OrderId) -> Decimal {
        self.vault.balance(&order_id)
    }

    /// Total value held across all orders, for conservation audits.
    pub fn total_escrowed(&self) -> Decimal {
        self.vault.total_held()
    }

    pub fn owner(&self) -> &AccountId {
        self.access.owner()
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn token_registry(&self) -> &TokenApprovalRegistry {
        &self.tokens
    }

    pub fn listings(&self) -> &ListingRegistry {
        &self.listings
    }

    pub fn stores(&self) -> &StoreRegistry {
        &self.stores
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn vault(&self) -> &EscrowVault {
        &self.vault
    }

    // ───────────────────────── Events ─────────────────────────

    /// Drain order and dispute events.
    pub fn drain_order_events(&mut self) -> Vec<MarketEvent> {
        self.ledger.drain_events()
    }

    /// Drain listing events.
    pub fn drain_listing_events(&mut self) -> Vec<MarketEvent> {
        self.listings.drain_events()
    }

    /// Drain store events.
    pub fn drain_store_events(&mut self) -> Vec<MarketEvent> {
        self.stores.drain_events()
    }

    /// Drain settlement events from the vault.
    pub fn drain_escrow_events(&mut self) -> Vec<EscrowEvent> {
        self.vault.drain_events()
    }

    /// Drain admin events.
    pub fn drain_admin_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.admin_events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), MarketplaceError> {
        if !self.access.is_owner(caller) {
            return Err(MarketplaceError::Unauthorized);
        }
        Ok(())
    }

    fn ensure_not_paused(&self) -> Result<(), MarketplaceError> {
        if self.pause.is_paused() {
            return Err(MarketplaceError::Paused);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn market() -> (Marketplace, AccountId, AccountId, AccountId) {
        let owner = AccountId::new();
        let mediator = AccountId::new();
        let collector = AccountId::new();
        let market = Marketplace::new(owner, mediator, 200, collector).unwrap();
        (market, owner, mediator, collector)
    }

    #[test]
    fn test_admin_ops_owner_only() {
        let (mut market, owner, _, _) = market();
        let eve = AccountId::new();

        assert_eq!(
            market.approve_token(&eve, "USDT", true).unwrap_err(),
            MarketplaceError::Unauthorized
        );
        market.approve_token(&owner, "USDT", true).unwrap();
        assert!(market
            .token_registry()
            .is_approved(&PaymentToken::token("USDT")));
    }

    #[test]
    fn test_set_fees_and_mediator() {
        let (mut market, owner, _, _) = market();
        let new_collector = AccountId::new();
        let new_mediator = AccountId::new();

        market.set_fees(&owner, 500, new_collector).unwrap();
        assert_eq!(market.config().fees().fee_bps(), 500);

        market.set_mediator(&owner, new_mediator).unwrap();
        assert!(market.config().is_mediator(&new_mediator));
    }

    #[test]
    fn test_set_fees_rejects_bad_bps() {
        let (mut market, owner, _, _) = market();
        let err = market
            .set_fees(&owner, 10_001, AccountId::new())
            .unwrap_err();
        assert!(matches!(err, MarketplaceError::Fee(_)));
    }

    #[test]
    fn test_pause_blocks_market_ops() {
        let (mut market, owner, _, _) = market();
        let seller = AccountId::new();
        market.pause(&owner).unwrap();
        assert!(market.is_paused());

        let err = market
            .create_store(seller, StoreProfile::default(), 0)
            .unwrap_err();
        assert_eq!(err, MarketplaceError::Paused);

        market.unpause(&owner).unwrap();
        market
            .create_store(seller, StoreProfile::default(), 0)
            .unwrap();
    }

    #[test]
    fn test_pause_does_not_block_admin() {
        let (mut market, owner, _, _) = market();
        market.pause(&owner).unwrap();
        market.approve_token(&owner, "USDT", true).unwrap();
        market.unpause(&owner).unwrap();
    }

    #[test]
    fn test_transfer_owner() {
        let (mut market, owner, _, _) = market();
        let successor = AccountId::new();
        market.transfer_owner(&owner, successor).unwrap();
        assert_eq!(market.owner(), &successor);

        // old owner lost the role
        assert_eq!(
            market.approve_token(&owner, "USDT", true).unwrap_err(),
            MarketplaceError::Unauthorized
        );
        market.approve_token(&successor, "USDT", true).unwrap();
    }

    #[test]
    fn test_admin_events_emitted() {
        let (mut market, owner, _, _) = market();
        market.approve_token(&owner, "USDT", true).unwrap();
        market.set_fees(&owner, 100, AccountId::new()).unwrap();
        let events = market.drain_admin_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], MarketEvent::TokenApprovalChanged(_)));
        assert!(matches!(events[1], MarketEvent::FeesChanged(_)));
    }
}
