//! Core contracts and analytics for btcnav.
//!
//! This crate contains:
//! - Canonical domain models and validation
//! - The valuation, attribution, forecast, and issuance calculators
//! - Data source traits/adapters with offline fallbacks
//! - Response envelope and structured errors

pub mod attribution;
pub mod circuit_breaker;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod fallback;
pub mod forecast;
pub mod http_client;
pub mod issuance;
pub mod providers;
pub mod report;
pub mod valuation;

pub use attribution::{AllocationSchedule, PeriodBucket};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use domain::{
    AllocationWeights, FundingSource, LedgerEntry, LiabilityAssumptions, MarketSnapshot,
    PurchaseRecord, ReportDate, SourceAmounts, Symbol, TreasuryState, UtcDateTime,
    ValuationResult,
};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};
pub use error::{CoreError, ForecastError, LedgerError, ValidationError};
pub use fallback::FallbackPolicy;
pub use forecast::{ForecastConfig, PowerLawModel};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use issuance::{AtmEstimate, CommonIssuanceEstimate, PreferredAtmParams};
pub use providers::{
    CapabilitySet, CoingeckoAdapter, DataSource, Endpoint, HealthState, HealthStatus,
    HistoryBatch, HistoryRequest, Holdings, HoldingsRequest, ProviderId, QuoteRequest,
    SourceError, SourceErrorKind, SpotPrice, TreasuriesAdapter, YahooAdapter,
};
pub use report::{
    AnalysisConfig, GatheredInputs, ReportError, ReportInputs, SourceStack, TreasuryReport,
};
