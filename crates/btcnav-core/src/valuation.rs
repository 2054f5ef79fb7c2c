//! Valuation metrics derived from the treasury position and an equity quote.
//!
//! Pure computation over immutable inputs. Every quotient is guarded:
//! `btc_per_share` and `leverage_amplification` follow the defined-zero
//! policy for degenerate denominators, while `premium_to_nav` stays absent
//! when `nav <= 0` so callers cannot mistake "not computable" for "cheap".

use crate::{LiabilityAssumptions, MarketSnapshot, TreasuryState, ValuationResult};

pub fn valuation(
    treasury: &TreasuryState,
    snapshot: &MarketSnapshot,
    liabilities: &LiabilityAssumptions,
) -> ValuationResult {
    let net_liabilities = liabilities.net_liabilities();
    let treasury_value = treasury.btc_held * treasury.btc_spot_price;

    let btc_per_share = if snapshot.shares_outstanding > 0 {
        treasury.btc_held / snapshot.shares_outstanding as f64
    } else {
        0.0
    };

    let leverage_amplification = if snapshot.market_cap > 0.0 {
        treasury_value / snapshot.market_cap
    } else {
        0.0
    };

    let nav = treasury_value - net_liabilities;
    let premium_to_nav = (nav > 0.0).then(|| snapshot.market_cap / nav);

    ValuationResult {
        treasury_value,
        btc_per_share,
        enterprise_value: snapshot.market_cap + net_liabilities,
        leverage_amplification,
        nav,
        premium_to_nav,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Symbol, UtcDateTime};

    fn snapshot(market_cap: f64, shares_outstanding: u64) -> MarketSnapshot {
        MarketSnapshot::new(
            Symbol::parse("MSTR").expect("valid symbol"),
            market_cap,
            shares_outstanding,
            240.0,
            12_000_000,
            245.0,
            236.0,
            UtcDateTime::now(),
        )
        .expect("snapshot should validate")
    }

    #[test]
    fn computes_reference_metrics() {
        let treasury = TreasuryState::new(687_410.0, 95_000.0).expect("valid treasury");
        let liabilities = LiabilityAssumptions::default();
        let result = valuation(&treasury, &snapshot(60.0e9, 250_000_000), &liabilities);

        assert_eq!(result.treasury_value, 65_303_950_000.0);
        assert_eq!(result.nav, 51_493_950_000.0);
        assert_eq!(result.enterprise_value, 73_810_000_000.0);
        let premium = result.premium_to_nav.expect("nav is positive");
        assert!((premium - 1.16518).abs() < 1e-4);
        assert!((result.btc_per_share - 0.00274964).abs() < 1e-8);
    }

    #[test]
    fn zero_market_cap_yields_zero_leverage() {
        let treasury = TreasuryState::new(100_000.0, 50_000.0).expect("valid treasury");
        let result = valuation(&treasury, &snapshot(0.0, 0), &LiabilityAssumptions::default());

        assert_eq!(result.leverage_amplification, 0.0);
        assert_eq!(result.btc_per_share, 0.0);
    }

    #[test]
    fn negative_nav_leaves_premium_absent() {
        let treasury = TreasuryState::new(10_000.0, 20_000.0).expect("valid treasury");
        let liabilities =
            LiabilityAssumptions::new(9.0e9, 0.0, 0.0).expect("liabilities should validate");
        let result = valuation(&treasury, &snapshot(5.0e9, 100_000_000), &liabilities);

        assert!(result.nav < 0.0);
        assert_eq!(result.premium_to_nav, None);
    }

    #[test]
    fn premium_times_nav_recovers_market_cap() {
        let treasury = TreasuryState::new(687_410.0, 95_000.0).expect("valid treasury");
        let result = valuation(
            &treasury,
            &snapshot(60.0e9, 250_000_000),
            &LiabilityAssumptions::default(),
        );

        let premium = result.premium_to_nav.expect("nav is positive");
        assert!((premium * result.nav - 60.0e9).abs() < 1.0);
    }
}
