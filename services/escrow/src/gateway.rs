//! Fungible-token transfer capability
//!
//! The vault never talks to a token contract directly; it depends on this
//! capability. For `Token(_)` assets a deposit is a pull-transfer that
//! consumes a prior allowance grant by the payer; for the native coin the
//! value is attached directly and no allowance exists. From the vault's
//! perspective both paths are one `pull` call.

use std::collections::HashMap;

use rust_decimal::Decimal;

use types::ids::AccountId;
use types::token::PaymentToken;

use crate::errors::GatewayError;

/// Transfer capability the vault depends on.
pub trait TokenGateway {
    /// Move `amount` of `token` from `payer` into custody.
    ///
    /// Token assets require a prior allowance grant; native assets are a
    /// direct value attachment.
    fn pull(
        &mut self,
        payer: &AccountId,
        token: &PaymentToken,
        amount: Decimal,
    ) -> Result<(), GatewayError>;

    /// Pay `amount` of `token` out of custody to `recipient`.
    fn push(
        &mut self,
        recipient: &AccountId,
        token: &PaymentToken,
        amount: Decimal,
    ) -> Result<(), GatewayError>;

    /// Current balance of `holder` in `token`.
    fn balance_of(&self, holder: &AccountId, token: &PaymentToken) -> Decimal;
}

/// In-memory token ledger implementing the gateway.
///
/// Balances are stored as `HashMap<AccountId, HashMap<PaymentToken, Decimal>>`;
/// allowances as `(payer, token) -> granted`. Used by tests and simulation in
/// place of real token contracts.
#[derive(Debug, Clone, Default)]
pub struct LedgerGateway {
    balances: HashMap<AccountId, HashMap<PaymentToken, Decimal>>,
    allowances: HashMap<(AccountId, PaymentToken), Decimal>,
}

impl LedgerGateway {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `holder` with `amount` of `token` (bootstrap/test helper).
    pub fn mint(&mut self, holder: AccountId, token: PaymentToken, amount: Decimal) {
        let entry = self
            .balances
            .entry(holder)
            .or_default()
            .entry(token)
            .or_insert(Decimal::ZERO);
        *entry += amount;
    }

    /// Grant the marketplace an allowance to pull `amount` from `payer`.
    ///
    /// Replaces any prior grant, matching the standard approve semantics.
    pub fn approve_allowance(&mut self, payer: AccountId, token: PaymentToken, amount: Decimal) {
        self.allowances.insert((payer, token), amount);
    }

    /// Remaining allowance granted by `payer` for `token`.
    pub fn allowance(&self, payer: &AccountId, token: &PaymentToken) -> Decimal {
        self.allowances
            .get(&(*payer, token.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn debit(
        &mut self,
        holder: &AccountId,
        token: &PaymentToken,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        let available = self.balance_of(holder, token);
        if available < amount {
            return Err(GatewayError::InsufficientBalance {
                token: token.to_string(),
                required: amount,
                available,
            });
        }
        let entry = self
            .balances
            .entry(*holder)
            .or_default()
            .entry(token.clone())
            .or_insert(Decimal::ZERO);
        *entry = entry
            .checked_sub(amount)
            .ok_or(GatewayError::Overflow)?;
        Ok(())
    }

    fn credit(
        &mut self,
        holder: &AccountId,
        token: &PaymentToken,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        let entry = self
            .balances
            .entry(*holder)
            .or_default()
            .entry(token.clone())
            .or_insert(Decimal::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or(GatewayError::Overflow)?;
        Ok(())
    }
}

impl TokenGateway for LedgerGateway {
    fn pull(
        &mut self,
        payer: &AccountId,
        token: &PaymentToken,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        // Token assets consume the allowance; native value is attached directly.
        if let PaymentToken::Token(_) = token {
            let granted = self.allowance(payer, token);
            if granted < amount {
                return Err(GatewayError::InsufficientAllowance {
                    token: token.to_string(),
                    required: amount,
                    granted,
                });
            }
            self.debit(payer, token, amount)?;
            self.allowances
                .insert((*payer, token.clone()), granted - amount);
        } else {
            self.debit(payer, token, amount)?;
        }
        Ok(())
    }

    fn push(
        &mut self,
        recipient: &AccountId,
        token: &PaymentToken,
        amount: Decimal,
    ) -> Result<(), GatewayError> {
        self.credit(recipient, token, amount)
    }

    fn balance_of(&self, holder: &AccountId, token: &PaymentToken) -> Decimal {
        self.balances
            .get(holder)
            .and_then(|assets| assets.get(token))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}
