//! Listing aggregate and inventory invariants
//!
//! A listing is exclusively owned by its seller; the registry mutates
//! `quantity` as orders reserve and restore units. The invariant
//! `quantity <= initial_quantity` holds at all times, and
//! `initial_quantity - quantity` is the number of units currently reserved
//! or sold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ListingError;
use crate::ids::{AccountId, ListingId, StoreId};
use crate::token::PaymentToken;

/// Free-form listing metadata; the core never interprets these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingMetadata {
    pub title: String,
    pub category: String,
    pub description: String,
    pub uri: String,
    pub date_added: String,
}

/// A priced, quantity-limited good offered by a seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub seller: AccountId,
    pub store_id: StoreId,
    pub payment_token: PaymentToken,
    /// Unit price in the payment asset's smallest denomination.
    pub price: Decimal,
    pub metadata: ListingMetadata,
    pub active: bool,
    /// Units still available for reservation.
    pub quantity: u64,
    /// Units at creation (or last re-stock); immutable cap for `quantity`.
    pub initial_quantity: u64,
    /// Irreversible cancellation marker; tombstoned listings reject all mutation.
    pub tombstoned: bool,
    pub created_at: i64,
}

impl Listing {
    /// Create a new active listing with full stock.
    pub fn new(
        id: ListingId,
        seller: AccountId,
        store_id: StoreId,
        payment_token: PaymentToken,
        price: Decimal,
        metadata: ListingMetadata,
        quantity: u64,
        created_at: i64,
    ) -> Result<Self, ListingError> {
        if price <= Decimal::ZERO {
            return Err(ListingError::InvalidPrice);
        }
        if quantity == 0 {
            return Err(ListingError::InvalidQuantity);
        }
        Ok(Self {
            id,
            seller,
            store_id,
            payment_token,
            price,
            metadata,
            active: true,
            quantity,
            initial_quantity: quantity,
            tombstoned: false,
            created_at,
        })
    }

    /// Units currently reserved or sold against this listing.
    pub fn reserved(&self) -> u64 {
        self.initial_quantity - self.quantity
    }

    /// Check the inventory invariant.
    pub fn check_invariant(&self) -> bool {
        self.quantity <= self.initial_quantity
    }

    /// Reserve `qty` units for a new order.
    ///
    /// Fails with `OutOfStock` when the listing is inactive or has fewer
    /// than `qty` units remaining.
    pub fn reserve(&mut self, qty: u64) -> Result<(), ListingError> {
        if qty == 0 {
            return Err(ListingError::InvalidQuantity);
        }
        if !self.active || self.tombstoned || qty > self.quantity {
            return Err(ListingError::OutOfStock {
                requested: qty,
                available: if self.active && !self.tombstoned {
                    self.quantity
                } else {
                    0
                },
            });
        }
        self.quantity -= qty;
        Ok(())
    }

    /// Return `qty` previously reserved units to stock.
    ///
    /// Exact inverse of `reserve`; must never push `quantity` above the cap.
    pub fn restore(&mut self, qty: u64) -> Result<(), ListingError> {
        let restored = self.quantity + qty;
        if restored > self.initial_quantity {
            return Err(ListingError::RestoreOverflow {
                quantity: self.quantity,
                restored: qty,
                cap: self.initial_quantity,
            });
        }
        self.quantity = restored;
        Ok(())
    }

    /// Replace the stock cap, preserving units already sold.
    ///
    /// The new cap must cover every unit already reserved; remaining stock is
    /// recomputed as `new_cap - reserved`.
    pub fn recap(&mut self, new_cap: u64) -> Result<(), ListingError> {
        if new_cap == 0 {
            return Err(ListingError::InvalidQuantity);
        }
        let sold = self.reserved();
        if new_cap < sold {
            return Err(ListingError::CapBelowSold { cap: new_cap, sold });
        }
        self.initial_quantity = new_cap;
        self.quantity = new_cap - sold;
        Ok(())
    }

    /// Update the unit price.
    pub fn set_price(&mut self, price: Decimal) -> Result<(), ListingError> {
        if price <= Decimal::ZERO {
            return Err(ListingError::InvalidPrice);
        }
        self.price = price;
        Ok(())
    }

    /// Seller update: price, active flag, and stock cap in one step.
    ///
    /// Validates everything before mutating anything, so a rejected update
    /// leaves the listing untouched.
    pub fn update(
        &mut self,
        price: Decimal,
        active: bool,
        new_cap: u64,
    ) -> Result<(), ListingError> {
        if price <= Decimal::ZERO {
            return Err(ListingError::InvalidPrice);
        }
        if new_cap == 0 {
            return Err(ListingError::InvalidQuantity);
        }
        let sold = self.reserved();
        if new_cap < sold {
            return Err(ListingError::CapBelowSold { cap: new_cap, sold });
        }
        self.price = price;
        self.active = active;
        self.initial_quantity = new_cap;
        self.quantity = new_cap - sold;
        Ok(())
    }

    /// Irreversibly cancel the listing. Only legal before any unit is sold.
    pub fn tombstone(&mut self) -> Result<(), ListingError> {
        let sold = self.reserved();
        if sold != 0 {
            return Err(ListingError::HasSales { sold });
        }
        self.active = false;
        self.tombstoned = true;
        Ok(())
    }
}
