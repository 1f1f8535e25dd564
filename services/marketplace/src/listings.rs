//! Listing registry
//!
//! Owns listing records and their available quantity. Sellers mutate their
//! own listings; the order ledger reserves and restores units as orders are
//! requested and cancelled. Listings are never deleted: cancellation is a
//! tombstone, and only a listing with zero units ever reserved can be
//! cancelled at all.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use escrow::tokens::TokenApprovalRegistry;
use types::errors::ListingError;
use types::ids::{AccountId, IdSequence, ListingId, StoreId};
use types::listing::{Listing, ListingMetadata};
use types::token::PaymentToken;

use crate::errors::MarketplaceError;
use crate::events::{
    ListingActivationChanged, ListingCancelled, ListingCreated, ListingUpdated, MarketEvent,
};
use crate::stores::StoreRegistry;

/// Registry of listings and their inventory.
#[derive(Debug, Default)]
pub struct ListingRegistry {
    listings: HashMap<ListingId, Listing>,
    seq: IdSequence,
    /// Emitted events log (append-only)
    events: Vec<MarketEvent>,
}

impl ListingRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            listings: HashMap::new(),
            seq: IdSequence::new(),
            events: Vec::new(),
        }
    }

    /// Create a listing.
    ///
    /// The payment token must be approved (native always is) and the caller
    /// must own the store the listing is filed under.
    #[allow(clippy::too_many_arguments)]
    pub fn create_listing(
        &mut self,
        tokens: &TokenApprovalRegistry,
        stores: &StoreRegistry,
        seller: AccountId,
        payment_token: PaymentToken,
        price: Decimal,
        metadata: ListingMetadata,
        quantity: u64,
        store_id: StoreId,
        now: i64,
    ) -> Result<ListingId, MarketplaceError> {
        if !tokens.is_approved(&payment_token) {
            return Err(MarketplaceError::TokenNotApproved {
                token: payment_token.to_string(),
            });
        }
        let store = stores
            .get(store_id)
            .ok_or(types::errors::StoreError::NotFound { store_id })?;
        if store.owner != seller {
            return Err(ListingError::Unauthorized.into());
        }

        let id = ListingId::from_raw(self.seq.next_raw());
        let listing = Listing::new(
            id,
            seller,
            store_id,
            payment_token.clone(),
            price,
            metadata,
            quantity,
            now,
        )?;
        self.listings.insert(id, listing);

        debug!(listing_id = %id, %seller, "listing created");

        self.events.push(MarketEvent::ListingCreated(ListingCreated {
            listing_id: id,
            seller,
            store_id,
            payment_token,
            price,
            quantity,
        }));
        Ok(id)
    }

    /// Seller update: price, active flag, and stock cap.
    ///
    /// The cap replaces `initial_quantity`; units already sold are preserved
    /// and the remaining stock recomputed. All-or-nothing.
    pub fn update_listing(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
        new_price: Decimal,
        active: bool,
        new_initial_quantity: u64,
    ) -> Result<(), MarketplaceError> {
        let listing = self.seller_listing_mut(listing_id, caller)?;
        listing.update(new_price, active, new_initial_quantity)?;
        let (price, active, initial_quantity, quantity) = (
            listing.price,
            listing.active,
            listing.initial_quantity,
            listing.quantity,
        );
        self.events.push(MarketEvent::ListingUpdated(ListingUpdated {
            listing_id,
            price,
            active,
            initial_quantity,
            quantity,
        }));
        Ok(())
    }

    /// Stop accepting orders against a listing. Quantity and pending orders
    /// are unaffected.
    pub fn deactivate_listing(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        self.set_active(listing_id, caller, false)
    }

    /// Resume accepting orders against a listing.
    pub fn reactivate_listing(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        self.set_active(listing_id, caller, true)
    }

    /// Irreversibly cancel a listing that never sold a unit.
    pub fn cancel_listing_if_no_sales(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<(), MarketplaceError> {
        let listing = self.seller_listing_mut(listing_id, caller)?;
        listing.tombstone()?;
        self.events
            .push(MarketEvent::ListingCancelled(ListingCancelled { listing_id }));
        Ok(())
    }

    // ───────────────────────── Inventory (ledger-internal) ─────────────────────────

    /// Reserve units for a new order.
    pub(crate) fn reserve(&mut self, listing_id: ListingId, qty: u64) -> Result<(), ListingError> {
        self.listing_mut(listing_id)?.reserve(qty)
    }

    /// Return previously reserved units to stock.
    pub(crate) fn restore(&mut self, listing_id: ListingId, qty: u64) -> Result<(), ListingError> {
        self.listing_mut(listing_id)?.restore(qty)
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Look up a listing by id.
    pub fn get(&self, listing_id: ListingId) -> Option<&Listing> {
        self.listings.get(&listing_id)
    }

    /// All listings owned by a seller.
    pub fn listings_by_seller(&self, seller: &AccountId) -> Vec<&Listing> {
        let mut found: Vec<&Listing> = self
            .listings
            .values()
            .filter(|listing| listing.seller == *seller)
            .collect();
        found.sort_by_key(|listing| listing.id);
        found
    }

    /// Number of listings ever created.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
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

    fn listing_mut(&mut self, listing_id: ListingId) -> Result<&mut Listing, ListingError> {
        self.listings
            .get_mut(&listing_id)
            .ok_or(ListingError::NotFound { listing_id })
    }

    /// Seller-gated mutable access: authorization first, tombstone second.
    fn seller_listing_mut(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
    ) -> Result<&mut Listing, ListingError> {
        let listing = self
            .listings
            .get_mut(&listing_id)
            .ok_or(ListingError::NotFound { listing_id })?;
        if listing.seller != *caller {
            return Err(ListingError::Unauthorized);
        }
        if listing.tombstoned {
            return Err(ListingError::Tombstoned);
        }
        Ok(listing)
    }

    fn set_active(
        &mut self,
        listing_id: ListingId,
        caller: &AccountId,
        active: bool,
    ) -> Result<(), MarketplaceError> {
        let listing = self.seller_listing_mut(listing_id, caller)?;
        listing.active = active;
        self.events
            .push(MarketEvent::ListingActivationChanged(ListingActivationChanged {
                listing_id,
                active,
            }));
        Ok(())
    }
}
