//! Seller storefront and reputation counters
//!
//! One store per identity. Rating counters only ever increase, and only the
//! order ledger bumps them (on delivery confirmation), so a seller can never
//! rate themselves.

use serde::{Deserialize, Serialize};

use crate::ids::{AccountId, StoreId};

/// Free-form storefront profile; opaque to the core.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub name: String,
    pub description: String,
    pub location: String,
    pub phone: String,
    pub image: String,
}

/// A seller's public storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub owner: AccountId,
    pub profile: StoreProfile,
    pub positive_ratings: u64,
    pub negative_ratings: u64,
    /// Tombstone flag; retained records keep this false after removal.
    pub exists: bool,
    pub created_at: i64,
}

impl Store {
    /// Create a new store with zeroed reputation.
    pub fn new(id: StoreId, owner: AccountId, profile: StoreProfile, created_at: i64) -> Self {
        Self {
            id,
            owner,
            profile,
            positive_ratings: 0,
            negative_ratings: 0,
            exists: true,
            created_at,
        }
    }

    /// Bump the reputation counters; counters are monotonic.
    pub fn record_rating(&mut self, positive: bool) {
        if positive {
            self.positive_ratings += 1;
        } else {
            self.negative_ratings += 1;
        }
    }

    /// Total ratings received.
    pub fn total_ratings(&self) -> u64 {
        self.positive_ratings + self.negative_ratings
    }
}
