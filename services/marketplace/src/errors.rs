//! Top-level marketplace error type
//!
//! Wraps the component taxonomies so every facade operation returns one
//! error type. Callers receive the error kind plus the offending fields;
//! a rejected call never partially applies.

use thiserror::Error;

use escrow::errors::VaultError;
use types::errors::{FeeError, ListingError, OrderError, StoreError};

/// Top-level marketplace error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketplaceError {
    #[error("Marketplace is paused")]
    Paused,

    #[error("Unauthorized: caller is not the owner")]
    Unauthorized,

    #[error("Token not approved: {token}")]
    TokenNotApproved { token: String },

    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("Fee error: {0}")]
    Fee(#[from] FeeError),
}
