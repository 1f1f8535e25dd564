//! Custody & Settlement for the Escrow Marketplace
//!
//! This crate implements the money-handling layer of the marketplace: funds
//! deposited against an order are held here until delivery confirmation
//! releases them, a cancellation refunds them, or a mediator splits them.
//!
//! # Modules
//! - `errors`: Custody-specific error types
//! - `events`: Settlement events
//! - `security`: Shared security primitives (access control, pause guard)
//! - `tokens`: Approved payment token registry
//! - `gateway`: Fungible-token transfer capability (allowance two-step)
//! - `vault`: Per-order escrow custody, release, refund, and split

pub mod errors;
pub mod events;
pub mod gateway;
pub mod security;
pub mod tokens;
pub mod vault;

/// Settlement surface version, frozen after release
pub const SETTLEMENT_ABI_VERSION: &str = "1.0.0";
