//! Marketplace core: order lifecycle, inventory, and dispute arbitration
//!
//! This crate implements the order state machine and the registries it
//! drives: listings (inventory reservation), stores (reputation), and the
//! dispute arbitration layer over the escrow vault. The `Marketplace` facade
//! wires the components together behind one exclusive-access boundary and
//! carries the owner-gated admin surface.
//!
//! # Modules
//! - `errors`: Top-level error type wrapping the component taxonomies
//! - `events`: Marketplace events (structured, append-only)
//! - `listings`: Listing registry and inventory bookkeeping
//! - `stores`: Store registry and reputation counters
//! - `ledger`: The order state machine
//! - `disputes`: Dispute arbitration over the ledger and vault
//! - `receipts`: Proof-of-purchase issuer capability
//! - `config`: Process-wide settlement configuration
//! - `market`: The facade tying everything together

pub mod config;
pub mod disputes;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod listings;
pub mod market;
pub mod receipts;
pub mod stores;

pub use market::Marketplace;
