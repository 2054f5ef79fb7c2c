use btcnav_core::attribution::{attribute, AllocationSchedule};
use btcnav_core::forecast::{extend, ForecastConfig, PowerLawModel};
use btcnav_core::{FallbackPolicy, FundingSource, ReportDate};

fn last_historical_entry() -> btcnav_core::LedgerEntry {
    let history = FallbackPolicy::default().sample_ledger();
    let entries = attribute(&history, &AllocationSchedule::default()).expect("sample attributes");
    *entries.last().expect("non-empty ledger")
}

#[test]
fn model_price_grows_over_the_horizon() {
    let model = PowerLawModel::default();
    let near = model
        .projected_price(ReportDate::parse("2026-12-31").expect("valid date"))
        .expect("positive price");
    let far = model
        .projected_price(ReportDate::parse("2035-12-31").expect("valid date"))
        .expect("positive price");

    assert!(near > 0.0);
    assert!(far > near);
}

#[test]
fn dates_at_or_before_the_epoch_have_no_price() {
    let model = PowerLawModel::default();
    assert!(model
        .projected_price(ReportDate::parse("2009-01-03").expect("valid date"))
        .is_none());
    assert!(model
        .projected_price(ReportDate::parse("2008-06-01").expect("valid date"))
        .is_none());
}

#[test]
fn extends_for_exactly_the_horizon_at_year_ends() {
    let last = last_historical_entry();
    let config = ForecastConfig::default();
    let projected = extend(&last, &config).expect("forecast succeeds");

    assert_eq!(projected.len(), config.horizon_years as usize);

    let first_year = last.report_date.year() + 1;
    for (offset, entry) in projected.iter().enumerate() {
        assert!(entry.projected);
        let expected =
            ReportDate::year_end(first_year + offset as i32).expect("valid year end");
        assert_eq!(entry.report_date, expected);
    }
}

#[test]
fn fixed_budget_buys_less_bitcoin_each_year() {
    let projected =
        extend(&last_historical_entry(), &ForecastConfig::default()).expect("forecast succeeds");

    for pair in projected.windows(2) {
        assert!(pair[1].btc_acquired < pair[0].btc_acquired);
    }
}

#[test]
fn forecast_chains_from_the_historical_totals() {
    let last = last_historical_entry();
    let projected = extend(&last, &ForecastConfig::default()).expect("forecast succeeds");

    let first = &projected[0];
    assert!(
        (first.cumulative_btc - (last.cumulative_btc + first.btc_acquired)).abs() < 1e-6
    );

    for source in FundingSource::ALL {
        let expected = last.cumulative_by_source.get(source) + first.allocation.get(source);
        assert!((first.cumulative_by_source.get(source) - expected).abs() < 1e-6);
    }
}

#[test]
fn forward_mix_puts_thirty_percent_in_common_stock() {
    let projected =
        extend(&last_historical_entry(), &ForecastConfig::default()).expect("forecast succeeds");

    for entry in &projected {
        let common = entry.allocation.get(FundingSource::CommonStock);
        assert!((common - entry.btc_acquired * 0.3).abs() < 1e-9);
    }
}

#[test]
fn shorter_horizon_and_budget_are_respected() {
    let config = ForecastConfig::new(
        3,
        1_000_000_000.0,
        ForecastConfig::default_weights(),
        PowerLawModel::default(),
    )
    .expect("valid config");

    let projected = extend(&last_historical_entry(), &config).expect("forecast succeeds");
    assert_eq!(projected.len(), 3);

    let model = PowerLawModel::default();
    let price = model
        .projected_price(projected[0].report_date)
        .expect("positive price");
    assert!((projected[0].btc_acquired - 1_000_000_000.0 / price).abs() < 1e-6);
}
