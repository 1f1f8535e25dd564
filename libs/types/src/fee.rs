//! Basis-point fee splitting
//!
//! Pure settlement arithmetic: a gross escrowed amount is split into the
//! seller's net payout and the marketplace fee. All amounts are integral
//! values in the asset's smallest denomination; the seller net rounds down
//! and the remainder joins the fee, so `net + fee == gross` always holds.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::FeeError;

/// Denominator for basis-point math: 1 bps = 0.01%.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Process-wide fee schedule, mutable only by the owner role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    fee_bps: u32,
}

impl FeeSchedule {
    /// Create a schedule; rejects rates above 100%.
    pub fn new(fee_bps: u32) -> Result<Self, FeeError> {
        if fee_bps > BPS_DENOMINATOR {
            return Err(FeeError::BpsOutOfRange {
                bps: fee_bps,
                max: BPS_DENOMINATOR,
            });
        }
        Ok(Self { fee_bps })
    }

    /// A schedule that takes no fee.
    pub fn zero() -> Self {
        Self { fee_bps: 0 }
    }

    /// Current rate in basis points.
    pub fn fee_bps(&self) -> u32 {
        self.fee_bps
    }

    /// Split a gross amount into `(seller_net, fee)`.
    ///
    /// `seller_net = floor(gross * (10000 - fee_bps) / 10000)`, fee takes the
    /// remainder. `split(1000, 200 bps) == (980, 20)`;
    /// `split(1, 9999 bps) == (0, 1)`.
    pub fn split(&self, gross: Decimal) -> (Decimal, Decimal) {
        debug_assert!(gross >= Decimal::ZERO, "gross must not be negative");
        let keep_bps = Decimal::from(BPS_DENOMINATOR - self.fee_bps);
        let net = (gross * keep_bps / Decimal::from(BPS_DENOMINATOR)).floor();
        (net, gross - net)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let schedule = FeeSchedule::new(200).unwrap();
        let (net, fee) = schedule.split(Decimal::from(1000));
        assert_eq!(net, Decimal::from(980));
        assert_eq!(fee, Decimal::from(20));
    }

    #[test]
    fn test_split_rounds_net_down() {
        let schedule = FeeSchedule::new(9999).unwrap();
        let (net, fee) = schedule.split(Decimal::from(1));
        assert_eq!(net, Decimal::ZERO);
        assert_eq!(fee, Decimal::from(1));
    }

    #[test]
    fn test_split_zero_fee() {
        let schedule = FeeSchedule::zero();
        let (net, fee) = schedule.split(Decimal::from(21));
        assert_eq!(net, Decimal::from(21));
        assert_eq!(fee, Decimal::ZERO);
    }

    #[test]
    fn test_split_full_fee() {
        let schedule = FeeSchedule::new(BPS_DENOMINATOR).unwrap();
        let (net, fee) = schedule.split(Decimal::from(500));
        assert_eq!(net, Decimal::ZERO);
        assert_eq!(fee, Decimal::from(500));
    }

    #[test]
    fn test_split_odd_amount() {
        // 21 at 200 bps: net floors from 20.58 to 20, fee takes the rest
        let schedule = FeeSchedule::new(200).unwrap();
        let (net, fee) = schedule.split(Decimal::from(21));
        assert_eq!(net, Decimal::from(20));
        assert_eq!(fee, Decimal::from(1));
    }

    #[test]
    fn test_new_rejects_over_100_percent() {
        let err = FeeSchedule::new(10_001).unwrap_err();
        assert_eq!(
            err,
            FeeError::BpsOutOfRange {
                bps: 10_001,
                max: 10_000
            }
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let schedule = FeeSchedule::new(250).unwrap();
        let json = serde_json::to_string(&schedule).unwrap();
        let deserialized: FeeSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, deserialized);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn split_conserves_gross(gross in 0u64..1_000_000_000, bps in 0u32..=10_000) {
                let schedule = FeeSchedule::new(bps).unwrap();
                let gross = Decimal::from(gross);
                let (net, fee) = schedule.split(gross);
                prop_assert_eq!(net + fee, gross);
                prop_assert!(net >= Decimal::ZERO);
                prop_assert!(fee >= Decimal::ZERO);
            }

            #[test]
            fn fee_never_exceeds_gross(gross in 0u64..1_000_000_000, bps in 0u32..=10_000) {
                let schedule = FeeSchedule::new(bps).unwrap();
                let gross = Decimal::from(gross);
                let (_, fee) = schedule.split(gross);
                prop_assert!(fee <= gross);
            }
        }
    }
}
