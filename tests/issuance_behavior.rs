use btcnav_core::issuance::{common_stock, preferred_atm, PreferredAtmParams};
use btcnav_core::{MarketSnapshot, Symbol, UtcDateTime};

fn snapshot(last_price: f64, volume: u64, high: f64, low: f64) -> MarketSnapshot {
    MarketSnapshot::new(
        Symbol::parse("MSTR").expect("valid symbol"),
        60.0e9,
        250_000_000,
        last_price,
        volume,
        high,
        low,
        UtcDateTime::now(),
    )
    .expect("valid snapshot")
}

#[test]
fn day_entirely_below_threshold_issues_nothing() {
    let params = PreferredAtmParams::default();
    let estimate = preferred_atm(&snapshot(90.0, 1_000_000, 95.0, 85.0), &params, 95_000.0);

    assert_eq!(estimate.volume_above_threshold, 0.0);
    assert_eq!(estimate.shares_issued, 0.0);
    assert_eq!(estimate.btc_acquired, 0.0);
}

#[test]
fn day_entirely_above_threshold_uses_full_volume() {
    let params = PreferredAtmParams::default();
    let estimate = preferred_atm(&snapshot(120.0, 1_000_000, 125.0, 110.0), &params, 95_000.0);

    assert_eq!(estimate.volume_above_threshold, 1_000_000.0);
}

#[test]
fn threshold_inside_the_range_apportions_volume_linearly() {
    // high 110, low 90, threshold 100: half the range is above it.
    let params = PreferredAtmParams::default();
    let estimate = preferred_atm(&snapshot(101.0, 1_000_000, 110.0, 90.0), &params, 95_000.0);

    assert!((estimate.volume_above_threshold - 500_000.0).abs() < 1e-6);
}

#[test]
fn flat_day_at_the_threshold_takes_the_full_volume_branch() {
    let params = PreferredAtmParams::default();
    let estimate = preferred_atm(&snapshot(100.0, 1_000_000, 100.0, 100.0), &params, 95_000.0);

    assert_eq!(estimate.volume_above_threshold, 1_000_000.0);
    assert!(estimate.net_proceeds.is_finite());
}

#[test]
fn atm_proceeds_are_net_of_commission_and_converted_to_bitcoin() {
    let params = PreferredAtmParams::new(100.0, 0.3, 0.02).expect("valid params");
    let estimate = preferred_atm(&snapshot(101.0, 1_000_000, 110.0, 90.0), &params, 95_000.0);

    // 500,000 above threshold, 30% issued, at 101 less 2% commission.
    assert!((estimate.shares_issued - 150_000.0).abs() < 1e-6);
    let expected_proceeds = 150_000.0 * 101.0 * 0.98;
    assert!((estimate.net_proceeds - expected_proceeds).abs() < 1e-3);
    assert!((estimate.btc_acquired - expected_proceeds / 95_000.0).abs() < 1e-9);
}

#[test]
fn common_issuance_interpolates_between_premium_bounds() {
    let snap = snapshot(240.0, 10_000_000, 245.0, 236.0);

    let at_floor = common_stock(Some(1.0), &snap, 95_000.0);
    assert_eq!(at_floor.issuance_fraction, 0.001);

    let midpoint = common_stock(Some(2.0), &snap, 95_000.0);
    assert!((midpoint.issuance_fraction - 0.0255).abs() < 1e-9);

    let above_ceiling = common_stock(Some(4.5), &snap, 95_000.0);
    assert_eq!(above_ceiling.issuance_fraction, 0.05);
}

#[test]
fn absent_premium_falls_back_to_the_floor_fraction() {
    let snap = snapshot(240.0, 10_000_000, 245.0, 236.0);
    let estimate = common_stock(None, &snap, 95_000.0);

    assert_eq!(estimate.issuance_fraction, 0.001);
    assert!(estimate.btc_acquired > 0.0);
}

#[test]
fn zero_spot_price_yields_zero_bitcoin_for_both_models() {
    let snap = snapshot(240.0, 10_000_000, 245.0, 236.0);

    let atm = preferred_atm(&snap, &PreferredAtmParams::default(), 0.0);
    let common = common_stock(Some(1.5), &snap, 0.0);

    assert_eq!(atm.btc_acquired, 0.0);
    assert_eq!(common.btc_acquired, 0.0);
}
