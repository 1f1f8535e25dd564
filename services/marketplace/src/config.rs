//! Process-wide settlement configuration
//!
//! Fee schedule, fee collector, and mediator identity. Mutable only through
//! the owner-gated admin surface; changes take effect on subsequent
//! settlements only, never retroactively on funds already paid out.

use serde::{Deserialize, Serialize};

use types::errors::FeeError;
use types::fee::FeeSchedule;
use types::ids::AccountId;

/// Settlement configuration read at release/resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    fees: FeeSchedule,
    fee_collector: AccountId,
    mediator: AccountId,
}

impl MarketConfig {
    /// Create the configuration; rejects fee rates above 100%.
    pub fn new(
        fee_bps: u32,
        fee_collector: AccountId,
        mediator: AccountId,
    ) -> Result<Self, FeeError> {
        Ok(Self {
            fees: FeeSchedule::new(fee_bps)?,
            fee_collector,
            mediator,
        })
    }

    /// Replace the fee schedule and collector.
    pub fn set_fees(&mut self, fee_bps: u32, collector: AccountId) -> Result<(), FeeError> {
        self.fees = FeeSchedule::new(fee_bps)?;
        self.fee_collector = collector;
        Ok(())
    }

    /// Replace the mediator.
    pub fn set_mediator(&mut self, mediator: AccountId) {
        self.mediator = mediator;
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    pub fn fee_collector(&self) -> AccountId {
        self.fee_collector
    }

    pub fn mediator(&self) -> AccountId {
        self.mediator
    }

    /// Check whether a caller is the configured mediator.
    pub fn is_mediator(&self, caller: &AccountId) -> bool {
        *caller == self.mediator
    }
}
