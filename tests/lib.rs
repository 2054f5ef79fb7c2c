// Shared fixtures for the behavioral test suites.
pub use btcnav_core::{
    providers::{
        CoingeckoAdapter, DataSource, HealthState, HistoryRequest, HoldingsRequest, ProviderId,
        QuoteRequest, SourceError, TreasuriesAdapter, YahooAdapter,
    },
    AnalysisConfig, FallbackPolicy, LiabilityAssumptions, MarketSnapshot, ReportInputs, Symbol,
    TreasuryState, UtcDateTime,
};
pub use std::sync::Arc;

/// A mid-range market snapshot matching the reference valuation worked
/// example: 60B market cap over a 51.5B NAV.
pub fn reference_snapshot() -> MarketSnapshot {
    MarketSnapshot::new(
        Symbol::parse("MSTR").expect("valid symbol"),
        60_000_000_000.0,
        250_000_000,
        240.0,
        10_000_000,
        245.0,
        236.0,
        UtcDateTime::now(),
    )
    .expect("valid snapshot")
}

pub fn reference_treasury() -> TreasuryState {
    TreasuryState::new(687_410.0, 95_000.0).expect("valid treasury state")
}

pub fn reference_inputs() -> ReportInputs {
    ReportInputs {
        treasury: reference_treasury(),
        snapshot: reference_snapshot(),
        history: FallbackPolicy::default().sample_ledger(),
    }
}
