//! Proof-of-purchase receipt issuer capability
//!
//! Receipt minting is owned by an external collaborator; the core only calls
//! through this trait. Issuance is best-effort: a failed mint is logged and
//! retried out-of-band, and NEVER rolls back the fund release that triggered
//! it.

use thiserror::Error;

use types::ids::{AccountId, OrderId, ReceiptId};

/// Receipt issuance errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiptError {
    #[error("Receipt issuer unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Capability for minting a non-fungible proof-of-purchase.
pub trait ReceiptIssuer {
    /// Mint a receipt for the buyer of a completed order.
    fn issue(
        &mut self,
        buyer: AccountId,
        order_id: OrderId,
        metadata_uri: &str,
    ) -> Result<ReceiptId, ReceiptError>;
}

/// A minted receipt as recorded by the in-memory issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedReceipt {
    pub receipt_id: ReceiptId,
    pub buyer: AccountId,
    pub order_id: OrderId,
    pub uri: String,
}

/// In-memory issuer used by tests and simulation.
#[derive(Debug, Clone, Default)]
pub struct RecordingReceiptIssuer {
    minted: Vec<MintedReceipt>,
}

impl RecordingReceiptIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receipts minted so far, in order.
    pub fn minted(&self) -> &[MintedReceipt] {
        &self.minted
    }
}

impl ReceiptIssuer for RecordingReceiptIssuer {
    fn issue(
        &mut self,
        buyer: AccountId,
        order_id: OrderId,
        metadata_uri: &str,
    ) -> Result<ReceiptId, ReceiptError> {
        let receipt_id = ReceiptId::new();
        self.minted.push(MintedReceipt {
            receipt_id,
            buyer,
            order_id,
            uri: metadata_uri.to_string(),
        });
        Ok(receipt_id)
    }
}

/// Issuer that always fails; exercises the best-effort path in tests.
#[derive(Debug, Clone, Default)]
pub struct FailingReceiptIssuer;

impl ReceiptIssuer for FailingReceiptIssuer {
    fn issue(
        &mut self,
        _buyer: AccountId,
        _order_id: OrderId,
        _metadata_uri: &str,
    ) -> Result<ReceiptId, ReceiptError> {
        Err(ReceiptError::Unavailable {
            reason: "mint endpoint unreachable".to_string(),
        })
    }
}
