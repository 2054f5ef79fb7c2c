//! Provider contracts and adapters.
//!
//! The core consumes four narrow data endpoints, each of which may fail or
//! return malformed data:
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | SpotPrice | — | [`SpotPrice`] | Current bitcoin spot price |
//! | Holdings | [`HoldingsRequest`] | [`Holdings`] | Total bitcoin held by the company |
//! | Quote | [`QuoteRequest`] | [`MarketSnapshot`] | Per-ticker equity quote |
//! | PurchaseHistory | [`HistoryRequest`] | [`HistoryBatch`] | Chronological purchase ledger |
//!
//! Adapters implement [`DataSource`]; fallback policy on failure lives in
//! [`crate::fallback`], not here.

mod coingecko;
mod treasuries;
mod yahoo;

pub use coingecko::CoingeckoAdapter;
pub use treasuries::{TreasuriesAdapter, DEFAULT_ENDPOINT_URL as TREASURIES_ENDPOINT_URL};
pub use yahoo::YahooAdapter;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{MarketSnapshot, PurchaseRecord, Symbol, UtcDateTime, ValidationError};

/// Canonical provider identifiers used in metadata and envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Coingecko,
    Treasuries,
    Yahoo,
}

impl ProviderId {
    pub const ALL: [Self; 3] = [Self::Coingecko, Self::Treasuries, Self::Yahoo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coingecko => "coingecko",
            Self::Treasuries => "treasuries",
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "coingecko" => Ok(Self::Coingecko),
            "treasuries" => Ok(Self::Treasuries),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Data endpoint type used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    SpotPrice,
    Holdings,
    Quote,
    PurchaseHistory,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SpotPrice => "spot_price",
            Self::Holdings => "holdings",
            Self::Quote => "quote",
            Self::PurchaseHistory => "purchase_history",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported endpoint matrix for a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub spot_price: bool,
    pub holdings: bool,
    pub quote: bool,
    pub purchase_history: bool,
}

impl CapabilitySet {
    pub const fn new(
        spot_price: bool,
        holdings: bool,
        quote: bool,
        purchase_history: bool,
    ) -> Self {
        Self {
            spot_price,
            holdings,
            quote,
            purchase_history,
        }
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::SpotPrice => self.spot_price,
            Endpoint::Holdings => self.holdings,
            Endpoint::Quote => self.quote,
            Endpoint::PurchaseHistory => self.purchase_history,
        }
    }

    pub fn supported_endpoints(self) -> Vec<&'static str> {
        let mut values = Vec::with_capacity(4);
        if self.spot_price {
            values.push("spot_price");
        }
        if self.holdings {
            values.push("holdings");
        }
        if self.quote {
            values.push("quote");
        }
        if self.purchase_history {
            values.push("purchase_history");
        }
        values
    }
}

/// Health state reported by the `sources` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub reachable: bool,
}

impl HealthStatus {
    pub const fn new(state: HealthState, reachable: bool) -> Self {
        Self { state, reachable }
    }

    pub const fn healthy() -> Self {
        Self::new(HealthState::Healthy, true)
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedEndpoint,
    Unavailable,
    MalformedData,
    InvalidRequest,
    Internal,
}

/// Structured source error; the caller decides whether a fallback applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unsupported_endpoint(endpoint: Endpoint) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedEndpoint,
            message: format!("endpoint '{endpoint}' is not supported by this source"),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn malformed_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::MalformedData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::UnsupportedEndpoint => "source.unsupported_endpoint",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::MalformedData => "source.malformed_data",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Current bitcoin spot price in USD.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotPrice {
    pub usd: f64,
    pub as_of: UtcDateTime,
}

/// Total bitcoin held by the company under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub btc: f64,
    pub as_of: UtcDateTime,
}

/// Ordered purchase ledger as reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryBatch {
    pub records: Vec<PurchaseRecord>,
}

/// Request payload for the quote endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub symbol: Symbol,
}

impl QuoteRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

/// Request payload for the holdings endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoldingsRequest {
    pub company: String,
}

impl HoldingsRequest {
    pub fn new(company: impl Into<String>) -> Result<Self, SourceError> {
        let company = company.into();
        if company.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "holdings request must name a company",
            ));
        }
        Ok(Self { company })
    }
}

/// Request payload for the purchase-history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub company: String,
}

impl HistoryRequest {
    pub fn new(company: impl Into<String>) -> Result<Self, SourceError> {
        let company = company.into();
        if company.trim().is_empty() {
            return Err(SourceError::invalid_request(
                "history request must name a company",
            ));
        }
        Ok(Self { company })
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the caller may invoke endpoints
/// concurrently to cut latency, and nothing here imposes ordering.
pub trait DataSource: Send + Sync {
    /// Unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Supported endpoint matrix.
    fn capabilities(&self) -> CapabilitySet;

    /// Fetch the current bitcoin spot price.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the endpoint is unsupported, the
    /// upstream is unavailable, or the payload cannot be parsed.
    fn spot_price<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SpotPrice, SourceError>> + Send + 'a>>;

    /// Fetch the company's total bitcoin holdings.
    fn holdings<'a>(
        &'a self,
        req: HoldingsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Holdings, SourceError>> + Send + 'a>>;

    /// Fetch the equity quote snapshot for a ticker.
    fn quote<'a>(
        &'a self,
        req: QuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>>;

    /// Fetch the chronological purchase ledger.
    fn purchase_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>>;

    /// Current health status of this source.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_set_lists_supported_endpoints() {
        let caps = CapabilitySet::new(true, false, false, true);
        assert!(caps.supports(Endpoint::SpotPrice));
        assert!(!caps.supports(Endpoint::Quote));
        assert_eq!(
            caps.supported_endpoints(),
            vec!["spot_price", "purchase_history"]
        );
    }

    #[test]
    fn rejects_blank_company_names() {
        let err = HoldingsRequest::new("  ").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            SourceError::unavailable("upstream down").code(),
            "source.unavailable"
        );
        assert_eq!(
            SourceError::malformed_data("bad payload").code(),
            "source.malformed_data"
        );
    }
}
