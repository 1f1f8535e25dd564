//! Escrow vault: per-order custody, release, refund, and split
//!
//! The vault holds exactly one balance per funded order, equal to the
//! order's `amount + shipping_fee` from deposit until settlement. Every
//! settlement path (release, refund, split) zeroes the balance in the same
//! operation that moves the funds; a failed operation moves nothing.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use types::fee::FeeSchedule;
use types::ids::{AccountId, OrderId};
use types::token::PaymentToken;

use crate::errors::VaultError;
use crate::events::{Deposited, EscrowEvent, Refunded, Released, SplitSettled};
use crate::gateway::TokenGateway;
use crate::tokens::TokenApprovalRegistry;

/// One order's escrowed funds.
#[derive(Debug, Clone, PartialEq, Eq)]
struct EscrowAccount {
    token: PaymentToken,
    buyer: AccountId,
    balance: Decimal,
}

/// Outcome of a dispute split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOutcome {
    pub to_buyer: Decimal,
    pub to_seller: Decimal,
    /// Unallocated remainder, paid to the fee collector.
    pub residual: Decimal,
}

/// Custody of funds per order.
///
/// All state-changing operations validate fully before moving any value, so
/// a rejected call leaves both the vault and the token ledger untouched.
#[derive(Debug, Default)]
pub struct EscrowVault {
    held: HashMap<OrderId, EscrowAccount>,
    /// Emitted events log (append-only)
    events: Vec<EscrowEvent>,
}

impl EscrowVault {
    /// Create an empty vault.
    pub fn new() -> Self {
        Self {
            held: HashMap::new(),
            events: Vec::new(),
        }
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Deposit the escrow total for an order.
    ///
    /// Fails `WrongAmount` unless `value` equals `expected` exactly; the
    /// payment token must still be approved. Pulls the value through the
    /// gateway (allowance two-step for token assets, attached value for
    /// native) and records the held balance.
    #[allow(clippy::too_many_arguments)]
    pub fn deposit(
        &mut self,
        gateway: &mut dyn TokenGateway,
        tokens: &TokenApprovalRegistry,
        order_id: OrderId,
        payer: AccountId,
        token: PaymentToken,
        expected: Decimal,
        value: Decimal,
    ) -> Result<EscrowEvent, VaultError> {
        if self.held.contains_key(&order_id) {
            return Err(VaultError::AlreadyFunded { order_id });
        }
        if expected <= Decimal::ZERO {
            return Err(VaultError::InvalidAmount);
        }
        if value != expected {
            return Err(VaultError::WrongAmount {
                expected,
                actual: value,
            });
        }
        if !tokens.is_approved(&token) {
            return Err(VaultError::TokenNotApproved {
                token: token.to_string(),
            });
        }

        gateway.pull(&payer, &token, value)?;

        self.held.insert(
            order_id,
            EscrowAccount {
                token: token.clone(),
                buyer: payer,
                balance: value,
            },
        );

        debug!(%order_id, %token, %value, "escrow funded");

        let event = EscrowEvent::Deposited(Deposited {
            order_id,
            payer,
            token,
            amount: value,
        });
        self.events.push(event.clone());
        Ok(event)
    }

    // ───────────────────────── Settlement ─────────────────────────

    /// Release the full balance to the seller, net of the marketplace fee.
    ///
    /// Returns `(seller_net, fee)`; the fee leg goes to `collector`.
    pub fn release(
        &mut self,
        gateway: &mut dyn TokenGateway,
        order_id: OrderId,
        seller: AccountId,
        fees: &FeeSchedule,
        collector: AccountId,
    ) -> Result<(Decimal, Decimal), VaultError> {
        let account = self
            .held
            .get(&order_id)
            .ok_or(VaultError::NoEscrow { order_id })?;
        let token = account.token.clone();
        let (seller_net, fee) = fees.split(account.balance);

        if seller_net > Decimal::ZERO {
            gateway.push(&seller, &token, seller_net)?;
        }
        if fee > Decimal::ZERO {
            gateway.push(&collector, &token, fee)?;
        }
        self.held.remove(&order_id);

        debug!(%order_id, %seller_net, %fee, "escrow released");

        self.events.push(EscrowEvent::Released(Released {
            order_id,
            seller,
            seller_net,
            fee,
        }));
        Ok((seller_net, fee))
    }

    /// Refund the full balance to the depositing buyer.
    pub fn refund(
        &mut self,
        gateway: &mut dyn TokenGateway,
        order_id: OrderId,
    ) -> Result<Decimal, VaultError> {
        let account = self
            .held
            .get(&order_id)
            .ok_or(VaultError::NoEscrow { order_id })?;
        let (buyer, token, amount) = (account.buyer, account.token.clone(), account.balance);

        gateway.push(&buyer, &token, amount)?;
        self.held.remove(&order_id);

        debug!(%order_id, %amount, "escrow refunded");

        self.events.push(EscrowEvent::Refunded(Refunded {
            order_id,
            buyer,
            amount,
        }));
        Ok(amount)
    }

    /// Split the balance between buyer and seller per a dispute resolution.
    ///
    /// Fails `OverAllocation` when the legs exceed the held balance; both
    /// legs are validated before any transfer. A shortfall residual is paid
    /// to the fee collector so the order's balance always ends at zero.
    pub fn split(
        &mut self,
        gateway: &mut dyn TokenGateway,
        order_id: OrderId,
        to_buyer: Decimal,
        seller: AccountId,
        to_seller: Decimal,
        collector: AccountId,
    ) -> Result<SplitOutcome, VaultError> {
        if to_buyer < Decimal::ZERO || to_seller < Decimal::ZERO {
            return Err(VaultError::NegativeLeg);
        }
        let account = self
            .held
            .get(&order_id)
            .ok_or(VaultError::NoEscrow { order_id })?;
        let requested = to_buyer + to_seller;
        if requested > account.balance {
            return Err(VaultError::OverAllocation {
                requested,
                available: account.balance,
            });
        }
        let (buyer, token) = (account.buyer, account.token.clone());
        let residual = account.balance - requested;

        if to_buyer > Decimal::ZERO {
            gateway.push(&buyer, &token, to_buyer)?;
        }
        if to_seller > Decimal::ZERO {
            gateway.push(&seller, &token, to_seller)?;
        }
        if residual > Decimal::ZERO {
            gateway.push(&collector, &token, residual)?;
        }
        self.held.remove(&order_id);

        debug!(%order_id, %to_buyer, %to_seller, %residual, "escrow split");

        self.events.push(EscrowEvent::SplitSettled(SplitSettled {
            order_id,
            to_buyer,
            to_seller,
            residual,
        }));
        Ok(SplitOutcome {
            to_buyer,
            to_seller,
            residual,
        })
    }

    // ───────────────────────── Balance Queries ─────────────────────────

    /// Balance held for an order; zero once settled or never funded.
    pub fn balance(&self, order_id: &OrderId) -> Decimal {
        self.held
            .get(order_id)
            .map(|account| account.balance)
            .unwrap_or(Decimal::ZERO)
    }

    /// Whether the vault currently holds funds for an order.
    pub fn is_held(&self, order_id: &OrderId) -> bool {
        self.held.contains_key(order_id)
    }

    /// Sum of all held balances, for conservation audits.
    pub fn total_held(&self) -> Decimal {
        self.held.values().map(|account| account.balance).sum()
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[EscrowEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<EscrowEvent> {
        std::mem::take(&mut self.events)
    }
}
