//! Dispute arbitration
//!
//! A thin orchestration layer over the order ledger and the escrow vault.
//! Either trading party may freeze a funded order into `Disputed`; only the
//! initiator may cancel the freeze, and only the configured mediator may
//! resolve it by splitting the escrowed funds. Both payout legs are checked
//! against the held balance before any value moves.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use escrow::gateway::TokenGateway;
use escrow::vault::EscrowVault;
use types::errors::OrderError;
use types::ids::{AccountId, OrderId};
use types::order::{OrderAction, OrderStatus, Receipt};

use crate::config::MarketConfig;
use crate::errors::MarketplaceError;
use crate::events::{DisputeCancelled, DisputeOpened, DisputeResolved, MarketEvent};
use crate::ledger::OrderLedger;
use crate::receipts::ReceiptIssuer;

/// Orchestrates the dispute transitions; holds no state of its own.
///
/// Dispute events are appended to the order ledger's log so consumers see
/// one ordered stream per order.
#[derive(Debug, Default)]
pub struct DisputeArbiter;

impl DisputeArbiter {
    pub fn new() -> Self {
        Self
    }

    /// Buyer or seller freezes a funded order.
    ///
    /// The current status is remembered so a cancelled dispute restores it
    /// exactly; the vault balance is untouched.
    pub fn open_dispute(
        &self,
        ledger: &mut OrderLedger,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = ledger.order_mut(order_id)?;
        if order.buyer != *caller && order.seller != *caller {
            return Err(OrderError::Unauthorized.into());
        }
        order.ensure_permits(OrderAction::OpenDispute)?;

        let before = order.status;
        order.open_dispute(*caller, now);

        debug!(%order_id, %before, "dispute opened");

        let event = MarketEvent::DisputeOpened(DisputeOpened {
            order_id,
            actor: *caller,
            before,
            after: OrderStatus::Disputed,
        });
        ledger.push_event(event.clone());
        Ok(event)
    }

    /// The dispute initiator withdraws it, restoring the prior status.
    pub fn cancel_dispute(
        &self,
        ledger: &mut OrderLedger,
        order_id: OrderId,
        caller: &AccountId,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        let order = ledger.order_mut(order_id)?;
        if order.status == OrderStatus::Disputed {
            let initiator = order.dispute.map(|info| info.initiator);
            if initiator != Some(*caller) {
                return Err(OrderError::Unauthorized.into());
            }
        }
        order.ensure_permits(OrderAction::CancelDispute)?;

        let before = order.status;
        let restored = order.cancel_dispute(now);

        debug!(%order_id, %restored, "dispute cancelled");

        let event = MarketEvent::DisputeCancelled(DisputeCancelled {
            order_id,
            actor: *caller,
            before,
            after: restored,
        });
        ledger.push_event(event.clone());
        Ok(event)
    }

    /// The mediator splits the escrow between buyer and seller.
    ///
    /// Fails `OverAllocation` when the legs exceed the held balance, checked
    /// before any transfer, all-or-nothing. A shortfall residual goes to the
    /// fee collector. Receipt issuance is best-effort.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve_dispute(
        &self,
        ledger: &mut OrderLedger,
        vault: &mut EscrowVault,
        gateway: &mut dyn TokenGateway,
        receipts: &mut dyn ReceiptIssuer,
        config: &MarketConfig,
        order_id: OrderId,
        caller: &AccountId,
        refund_to_buyer: Decimal,
        payout_to_seller: Decimal,
        receipt_uri: String,
        now: i64,
    ) -> Result<MarketEvent, MarketplaceError> {
        if !config.is_mediator(caller) {
            return Err(OrderError::Unauthorized.into());
        }
        let order = ledger.order_ref(order_id)?;
        if order.completed {
            return Err(OrderError::AlreadyCompleted.into());
        }
        order.ensure_permits(OrderAction::ResolveDispute)?;
        let buyer = order.buyer;
        let seller = order.seller;
        let before = order.status;

        let outcome = vault.split(
            gateway,
            order_id,
            refund_to_buyer,
            seller,
            payout_to_seller,
            config.fee_collector(),
        )?;

        let receipt = match receipts.issue(buyer, order_id, &receipt_uri) {
            Ok(token_id) => Some(Receipt {
                token_id,
                uri: receipt_uri,
            }),
            Err(err) => {
                warn!(%order_id, %err, "receipt mint failed; settlement stands, retry out-of-band");
                None
            }
        };

        let order = ledger.order_mut(order_id)?;
        order.completed = true;
        order.funds_escrowed = false;
        order.receipt = receipt;
        order.advance(OrderStatus::DisputeResolved, now);

        debug!(%order_id, %refund_to_buyer, %payout_to_seller, residual = %outcome.residual, "dispute resolved");

        let event = MarketEvent::DisputeResolved(DisputeResolved {
            order_id,
            actor: *caller,
            refund_to_buyer,
            payout_to_seller,
            residual: outcome.residual,
            before,
            after: OrderStatus::DisputeResolved,
        });
        ledger.push_event(event.clone());
        Ok(event)
    }
}
