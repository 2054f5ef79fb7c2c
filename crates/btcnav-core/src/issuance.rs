//! Daily new-share issuance estimators.
//!
//! Two independent pure models: at-the-money issuance of a preferred
//! instrument inferred from the intraday range, and common-stock issuance
//! inferred from the valuation premium. Both convert estimated proceeds
//! into bitcoin at the current spot price.

use crate::{MarketSnapshot, ValidationError};
use serde::{Deserialize, Serialize};

/// Parameters for the preferred at-the-money model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferredAtmParams {
    /// Price floor above which the ATM program is assumed active.
    pub threshold: f64,
    /// Fraction of above-threshold volume assumed to be newly issued shares.
    pub atm_fraction: f64,
    /// Sales-agent commission taken out of gross proceeds.
    pub commission_rate: f64,
}

impl PreferredAtmParams {
    pub fn new(
        threshold: f64,
        atm_fraction: f64,
        commission_rate: f64,
    ) -> Result<Self, ValidationError> {
        crate::domain::validate_non_negative("threshold", threshold)?;
        crate::domain::validate_fraction("atm_fraction", atm_fraction)?;
        crate::domain::validate_fraction("commission_rate", commission_rate)?;

        Ok(Self {
            threshold,
            atm_fraction,
            commission_rate,
        })
    }
}

impl Default for PreferredAtmParams {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            atm_fraction: 0.3,
            commission_rate: 0.02,
        }
    }
}

/// Output of the preferred ATM estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmEstimate {
    pub volume_above_threshold: f64,
    pub shares_issued: f64,
    pub net_proceeds: f64,
    pub btc_acquired: f64,
}

/// Output of the common-stock issuance estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommonIssuanceEstimate {
    pub issuance_fraction: f64,
    pub new_shares: f64,
    pub proceeds: f64,
    pub btc_acquired: f64,
}

/// Estimate preferred-share ATM issuance from the intraday trading range.
///
/// Volume above the threshold is resolved in three branches: none of the
/// day traded above it, all of it did, or the threshold splits the range
/// and volume is apportioned linearly. A flat day at or above the
/// threshold takes the all-of-it branch, so `high - low` is never zero
/// where it divides.
pub fn preferred_atm(
    snapshot: &MarketSnapshot,
    params: &PreferredAtmParams,
    btc_spot_price: f64,
) -> AtmEstimate {
    let volume = snapshot.daily_volume as f64;

    let volume_above_threshold = if snapshot.high < params.threshold {
        0.0
    } else if snapshot.low >= params.threshold {
        volume
    } else {
        let fraction =
            ((snapshot.high - params.threshold) / (snapshot.high - snapshot.low)).clamp(0.0, 1.0);
        volume * fraction
    };

    let shares_issued = volume_above_threshold * params.atm_fraction;
    let net_proceeds = shares_issued * snapshot.last_price * (1.0 - params.commission_rate);
    let btc_acquired = if btc_spot_price > 0.0 {
        net_proceeds / btc_spot_price
    } else {
        0.0
    };

    AtmEstimate {
        volume_above_threshold,
        shares_issued,
        net_proceeds,
        btc_acquired,
    }
}

const MIN_ISSUANCE_FRACTION: f64 = 0.001;
const MAX_ISSUANCE_FRACTION: f64 = 0.05;
const PREMIUM_FLOOR: f64 = 1.0;
const PREMIUM_CEILING: f64 = 3.0;

/// Estimate common-stock issuance from the premium to NAV.
///
/// An absent premium (NAV not positive, see the valuation contract) is
/// treated as 0 here: issuance stays at the floor fraction rather than
/// failing the estimate.
pub fn common_stock(
    premium_to_nav: Option<f64>,
    snapshot: &MarketSnapshot,
    btc_spot_price: f64,
) -> CommonIssuanceEstimate {
    let premium = premium_to_nav.unwrap_or(0.0);

    let issuance_fraction = if premium <= PREMIUM_FLOOR {
        MIN_ISSUANCE_FRACTION
    } else if premium >= PREMIUM_CEILING {
        MAX_ISSUANCE_FRACTION
    } else {
        MIN_ISSUANCE_FRACTION
            + (MAX_ISSUANCE_FRACTION - MIN_ISSUANCE_FRACTION) * (premium - PREMIUM_FLOOR)
                / (PREMIUM_CEILING - PREMIUM_FLOOR)
    };

    let new_shares = snapshot.daily_volume as f64 * issuance_fraction;
    let proceeds = new_shares * snapshot.last_price;
    let btc_acquired = if btc_spot_price > 0.0 {
        proceeds / btc_spot_price
    } else {
        0.0
    };

    CommonIssuanceEstimate {
        issuance_fraction,
        new_shares,
        proceeds,
        btc_acquired,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, UtcDateTime};

    fn snapshot(last: f64, volume: u64, high: f64, low: f64) -> MarketSnapshot {
        MarketSnapshot::new(
            Symbol::parse("STRC").expect("valid symbol"),
            1.0e9,
            10_000_000,
            last,
            volume,
            high,
            low,
            UtcDateTime::now(),
        )
        .expect("snapshot should validate")
    }

    #[test]
    fn whole_day_below_threshold_issues_nothing() {
        let params = PreferredAtmParams::new(100.0, 0.3, 0.02).expect("valid params");
        let estimate = preferred_atm(&snapshot(98.0, 500_000, 99.0, 96.0), &params, 95_000.0);

        assert_eq!(estimate.volume_above_threshold, 0.0);
        assert_eq!(estimate.btc_acquired, 0.0);
    }

    #[test]
    fn whole_day_above_threshold_uses_full_volume() {
        let params = PreferredAtmParams::new(100.0, 0.3, 0.02).expect("valid params");
        let estimate = preferred_atm(&snapshot(103.0, 500_000, 104.0, 101.0), &params, 95_000.0);

        assert_eq!(estimate.volume_above_threshold, 500_000.0);
        assert_eq!(estimate.shares_issued, 150_000.0);
    }

    #[test]
    fn flat_day_at_threshold_is_not_a_division_by_zero() {
        let params = PreferredAtmParams::new(100.0, 0.3, 0.02).expect("valid params");
        let estimate = preferred_atm(&snapshot(100.0, 500_000, 100.0, 100.0), &params, 95_000.0);

        assert_eq!(estimate.volume_above_threshold, 500_000.0);
    }

    #[test]
    fn threshold_inside_range_interpolates_linearly() {
        let params = PreferredAtmParams::new(100.0, 0.5, 0.0).expect("valid params");
        // Threshold sits at the midpoint of the 102..98 range.
        let estimate = preferred_atm(&snapshot(101.0, 400_000, 102.0, 98.0), &params, 100_000.0);

        assert!((estimate.volume_above_threshold - 200_000.0).abs() < 1e-9);
        assert!((estimate.shares_issued - 100_000.0).abs() < 1e-9);
        assert!((estimate.net_proceeds - 10_100_000.0).abs() < 1e-6);
        assert!((estimate.btc_acquired - 101.0).abs() < 1e-9);
    }

    #[test]
    fn zero_spot_price_yields_zero_btc() {
        let params = PreferredAtmParams::default();
        let estimate = preferred_atm(&snapshot(103.0, 500_000, 104.0, 101.0), &params, 0.0);
        assert_eq!(estimate.btc_acquired, 0.0);

        let common = common_stock(Some(2.0), &snapshot(240.0, 1_000_000, 245.0, 236.0), 0.0);
        assert_eq!(common.btc_acquired, 0.0);
    }

    #[test]
    fn issuance_fraction_follows_premium_curve() {
        let quote = snapshot(240.0, 1_000_000, 245.0, 236.0);

        let floor = common_stock(Some(1.0), &quote, 95_000.0);
        assert_eq!(floor.issuance_fraction, 0.001);

        let midpoint = common_stock(Some(2.0), &quote, 95_000.0);
        assert!((midpoint.issuance_fraction - 0.0255).abs() < 1e-12);

        let ceiling = common_stock(Some(3.0), &quote, 95_000.0);
        assert_eq!(ceiling.issuance_fraction, 0.05);

        let beyond = common_stock(Some(5.5), &quote, 95_000.0);
        assert_eq!(beyond.issuance_fraction, 0.05);
    }

    #[test]
    fn absent_premium_stays_at_floor_fraction() {
        let quote = snapshot(240.0, 1_000_000, 245.0, 236.0);
        let estimate = common_stock(None, &quote, 95_000.0);

        assert_eq!(estimate.issuance_fraction, 0.001);
        assert_eq!(estimate.new_shares, 1_000.0);
    }

    #[test]
    fn params_reject_out_of_range_fractions() {
        let err = PreferredAtmParams::new(100.0, 1.2, 0.02).expect_err("must fail");
        assert!(matches!(err, ValidationError::FractionOutOfRange { .. }));
    }
}
