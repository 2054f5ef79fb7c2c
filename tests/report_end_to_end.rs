use btcnav_core::report::{build_report, gather_inputs, ReportError, SourceStack};
use btcnav_core::{AnalysisConfig, FallbackPolicy, MarketSnapshot, Symbol, TreasuryState};
use btcnav_tests::reference_inputs;

#[tokio::test]
async fn offline_pipeline_produces_a_complete_report() {
    let sources = SourceStack::offline();
    let symbol = Symbol::parse("MSTR").expect("valid symbol");
    let config = AnalysisConfig::default();

    let gathered = gather_inputs(&sources, &symbol, "MicroStrategy", &config.fallback)
        .await
        .expect("offline gather succeeds");
    assert!(!gathered.degraded);
    assert_eq!(gathered.source_chain.len(), 3);

    let report = build_report(gathered.inputs, &config).expect("report builds");

    let historical: Vec<_> = report.ledger.iter().filter(|e| !e.projected).collect();
    let projected: Vec<_> = report.ledger.iter().filter(|e| e.projected).collect();
    assert_eq!(historical.len(), 14);
    assert_eq!(projected.len(), config.forecast.horizon_years as usize);

    assert!(report.valuation.treasury_value > 0.0);
    assert!(report.preferred_atm.net_proceeds >= 0.0);
    assert!(report.common_issuance.issuance_fraction >= 0.001);
}

#[tokio::test]
async fn report_ledger_is_strictly_ordered_and_monotone() {
    let sources = SourceStack::offline();
    let symbol = Symbol::parse("MSTR").expect("valid symbol");
    let config = AnalysisConfig::default();

    let gathered = gather_inputs(&sources, &symbol, "MicroStrategy", &config.fallback)
        .await
        .expect("offline gather succeeds");
    let report = build_report(gathered.inputs, &config).expect("report builds");

    for pair in report.ledger.windows(2) {
        assert!(pair[1].report_date >= pair[0].report_date);
        assert!(pair[1].cumulative_btc >= pair[0].cumulative_btc);
    }

    // The boundary from historical to projected entries happens once.
    let flips = report
        .ledger
        .windows(2)
        .filter(|pair| pair[0].projected != pair[1].projected)
        .count();
    assert_eq!(flips, 1);
}

#[test]
fn unusable_spot_price_fails_the_report_outright() {
    let mut inputs = reference_inputs();
    inputs.treasury = TreasuryState::new(687_410.0, 0.0).expect("valid state");

    let err = build_report(inputs, &AnalysisConfig::default()).expect_err("must fail");
    assert!(matches!(err, ReportError::PrimaryInputsUnavailable { .. }));
}

#[test]
fn unusable_market_cap_fails_the_report_outright() {
    let mut inputs = reference_inputs();
    inputs.snapshot = MarketSnapshot::zeroed(inputs.snapshot.symbol.clone());

    let err = build_report(inputs, &AnalysisConfig::default()).expect_err("must fail");
    assert!(matches!(err, ReportError::PrimaryInputsUnavailable { .. }));
}

#[test]
fn zeroed_snapshot_still_yields_a_treasury_valuation() {
    let inputs = reference_inputs();
    let snapshot = MarketSnapshot::zeroed(inputs.snapshot.symbol.clone());
    let config = AnalysisConfig::default();

    let result = btcnav_core::valuation::valuation(&inputs.treasury, &snapshot, &config.liabilities);

    assert!(result.treasury_value > 0.0);
    assert_eq!(result.premium_to_nav, Some(0.0));
    assert_eq!(result.btc_per_share, 0.0);
    assert_eq!(result.leverage_amplification, 0.0);
}

#[test]
fn report_serializes_round_trip() {
    let config = AnalysisConfig::default();
    let report = build_report(reference_inputs(), &config).expect("report builds");

    let text = serde_json::to_string(&report).expect("serializes");
    let parsed: btcnav_core::TreasuryReport =
        serde_json::from_str(&text).expect("deserializes");

    assert_eq!(parsed.ledger.len(), report.ledger.len());
    assert_eq!(parsed.valuation.nav, report.valuation.nav);
}

#[test]
fn empty_history_yields_valuation_but_no_ledger() {
    let mut inputs = reference_inputs();
    inputs.history.clear();

    let report = build_report(inputs, &AnalysisConfig::default()).expect("report builds");
    assert!(report.ledger.is_empty());
    assert!(report.valuation.nav > 0.0);
}

#[test]
fn fallback_policy_matches_the_offline_holdings() {
    let fallback = FallbackPolicy::default();
    let ledger = fallback.sample_ledger();

    assert_eq!(fallback.holdings_btc, 687_410.0);
    assert_eq!(
        ledger.last().expect("non-empty").cumulative_btc,
        fallback.holdings_btc
    );
}
