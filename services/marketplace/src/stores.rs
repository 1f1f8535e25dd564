//! Store registry
//!
//! One storefront per identity. Profile mutation is owner-only; rating
//! counters are bumped exclusively by the order ledger when a buyer confirms
//! delivery, so there is no path for a seller to rate themselves.

use std::collections::HashMap;

use types::errors::StoreError;
use types::ids::{AccountId, IdSequence, OrderId, StoreId};
use types::store::{Store, StoreProfile};

use crate::events::{MarketEvent, StoreCreated, StoreRated, StoreUpdated};

/// Registry of seller storefronts.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: HashMap<StoreId, Store>,
    by_owner: HashMap<AccountId, StoreId>,
    seq: IdSequence,
    /// Emitted events log (append-only)
    events: Vec<MarketEvent>,
}

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            stores: HashMap::new(),
            by_owner: HashMap::new(),
            seq: IdSequence::new(),
            events: Vec::new(),
        }
    }

    /// Open a store for an identity. One store per identity.
    pub fn create_store(
        &mut self,
        owner: AccountId,
        profile: StoreProfile,
        now: i64,
    ) -> Result<StoreId, StoreError> {
        if let Some(existing) = self.by_owner.get(&owner) {
            return Err(StoreError::AlreadyExists {
                store_id: *existing,
            });
        }
        let id = StoreId::from_raw(self.seq.next_raw());
        self.stores.insert(id, Store::new(id, owner, profile, now));
        self.by_owner.insert(owner, id);
        self.events
            .push(MarketEvent::StoreCreated(StoreCreated { store_id: id, owner }));
        Ok(id)
    }

    /// Replace the storefront profile. Owner only.
    pub fn update_store(
        &mut self,
        store_id: StoreId,
        caller: &AccountId,
        profile: StoreProfile,
    ) -> Result<(), StoreError> {
        let store = self
            .stores
            .get_mut(&store_id)
            .ok_or(StoreError::NotFound { store_id })?;
        if store.owner != *caller {
            return Err(StoreError::Unauthorized);
        }
        store.profile = profile;
        self.events
            .push(MarketEvent::StoreUpdated(StoreUpdated { store_id }));
        Ok(())
    }

    /// Bump reputation after a confirmed delivery. Ledger-internal.
    pub(crate) fn record_rating(
        &mut self,
        store_id: StoreId,
        order_id: OrderId,
        positive: bool,
    ) -> Result<(), StoreError> {
        let store = self
            .stores
            .get_mut(&store_id)
            .ok_or(StoreError::NotFound { store_id })?;
        store.record_rating(positive);
        self.events.push(MarketEvent::StoreRated(StoreRated {
            store_id,
            order_id,
            positive,
        }));
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    /// Look up a store by id.
    pub fn get(&self, store_id: StoreId) -> Option<&Store> {
        self.stores.get(&store_id)
    }

    /// Look up the store owned by an identity.
    pub fn store_of_owner(&self, owner: &AccountId) -> Option<&Store> {
        self.by_owner.get(owner).and_then(|id| self.stores.get(id))
    }

    /// Number of stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    /// Get all emitted events.
    pub fn events(&self) -> &[MarketEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<MarketEvent> {
        std::mem::take(&mut self.events)
    }
}
