use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::providers::{
    CapabilitySet, DataSource, Endpoint, HealthState, HealthStatus, HistoryBatch, HistoryRequest,
    Holdings, HoldingsRequest, ProviderId, QuoteRequest, SourceError, SpotPrice,
};
use crate::{MarketSnapshot, Symbol, UtcDateTime, ValidationError};

/// Yahoo Finance adapter: per-ticker equity quote snapshots.
#[derive(Clone)]
pub struct YahooAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    use_real_api: bool,
}

impl Default for YahooAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            use_real_api: false,
        }
    }
}

impl YahooAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    async fn fetch_real_quote(&self, symbol: &Symbol) -> Result<MarketSnapshot, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable("yahoo circuit breaker is open"));
        }

        let endpoint = format!(
            "https://query1.finance.yahoo.com/v7/finance/quote?symbols={}&fields=marketCap,sharesOutstanding,regularMarketPrice,regularMarketVolume,regularMarketDayHigh,regularMarketDayLow",
            urlencoding::encode(symbol.as_str())
        );

        let request = HttpRequest::get(endpoint)
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(10_000);

        let response = self.http_client.execute(request).await.map_err(|e| {
            self.circuit_breaker.record_failure();
            SourceError::unavailable(format!("yahoo transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(SourceError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            )));
        }

        self.circuit_breaker.record_success();
        parse_quote_response(&response.body, symbol)
    }

    /// Deterministic quote used in offline mode, seeded from the ticker so
    /// distinct symbols get distinct but stable snapshots.
    fn offline_quote(&self, symbol: &Symbol) -> Result<MarketSnapshot, SourceError> {
        let seed = symbol_seed(symbol);
        let last_price = 180.0 + (seed % 1_200) as f64 / 10.0;

        MarketSnapshot::new(
            symbol.clone(),
            50.0e9 + (seed % 200) as f64 * 1.0e8,
            250_000_000 + seed % 1_000_000,
            last_price,
            10_000_000 + seed % 5_000_000,
            last_price * 1.03,
            last_price * 0.97,
            UtcDateTime::now(),
        )
        .map_err(validation_to_error)
    }
}

fn parse_quote_response(body: &str, symbol: &Symbol) -> Result<MarketSnapshot, SourceError> {
    let payload: YahooQuoteResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed_data(format!("yahoo payload: {e}")))?;

    if let Some(error) = &payload.quote_response.error {
        if !error.is_empty() {
            return Err(SourceError::unavailable(format!("yahoo API error: {error}")));
        }
    }

    let quote = payload
        .quote_response
        .result
        .into_iter()
        .find(|quote| quote.symbol.eq_ignore_ascii_case(symbol.as_str()))
        .ok_or_else(|| {
            SourceError::malformed_data(format!("yahoo response is missing {symbol}"))
        })?;

    MarketSnapshot::new(
        symbol.clone(),
        quote.market_cap.unwrap_or(0.0),
        quote.shares_outstanding.unwrap_or(0).max(0) as u64,
        quote.regular_market_price.unwrap_or(0.0),
        quote.regular_market_volume.unwrap_or(0).max(0) as u64,
        quote.day_high.unwrap_or(0.0),
        quote.day_low.unwrap_or(0.0),
        UtcDateTime::now(),
    )
    .map_err(validation_to_error)
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(0_u64, |acc, byte| {
        acc.wrapping_mul(33).wrapping_add(byte as u64)
    })
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::malformed_data(error.to_string())
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponseData {
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteData {
    symbol: String,
    #[serde(rename = "marketCap")]
    market_cap: Option<f64>,
    #[serde(rename = "sharesOutstanding")]
    shares_outstanding: Option<i64>,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketVolume")]
    regular_market_volume: Option<i64>,
    #[serde(rename = "regularMarketDayHigh")]
    day_high: Option<f64>,
    #[serde(rename = "regularMarketDayLow")]
    day_low: Option<f64>,
}

impl DataSource for YahooAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(false, false, true, false)
    }

    fn spot_price<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SpotPrice, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported_endpoint(Endpoint::SpotPrice)) })
    }

    fn holdings<'a>(
        &'a self,
        _req: HoldingsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Holdings, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported_endpoint(Endpoint::Holdings)) })
    }

    fn quote<'a>(
        &'a self,
        req: QuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_quote(&req.symbol).await
            } else {
                self.offline_quote(&req.symbol)
            }
        })
    }

    fn purchase_history<'a>(
        &'a self,
        _req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(Endpoint::PurchaseHistory))
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            match self.circuit_breaker.state() {
                CircuitState::Closed => HealthStatus::healthy(),
                CircuitState::HalfOpen => HealthStatus::new(HealthState::Degraded, true),
                CircuitState::Open => HealthStatus::new(HealthState::Unhealthy, false),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::SourceErrorKind;

    #[test]
    fn parses_quote_payload() {
        let body = r#"{"quoteResponse":{"result":[{
            "symbol": "MSTR",
            "marketCap": 60000000000.0,
            "sharesOutstanding": 250000000,
            "regularMarketPrice": 240.0,
            "regularMarketVolume": 12000000,
            "regularMarketDayHigh": 245.0,
            "regularMarketDayLow": 236.0
        }]}}"#;

        let symbol = Symbol::parse("MSTR").expect("valid symbol");
        let snapshot = parse_quote_response(body, &symbol).expect("must parse");

        assert_eq!(snapshot.market_cap, 60.0e9);
        assert_eq!(snapshot.shares_outstanding, 250_000_000);
        assert_eq!(snapshot.high, 245.0);
    }

    #[test]
    fn missing_ticker_is_malformed_data() {
        let body = r#"{"quoteResponse":{"result":[],"error":null}}"#;
        let symbol = Symbol::parse("MSTR").expect("valid symbol");

        let err = parse_quote_response(body, &symbol).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::MalformedData);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let body = r#"{"quoteResponse":{"result":[{"symbol":"MSTR"}]}}"#;
        let symbol = Symbol::parse("MSTR").expect("valid symbol");

        let snapshot = parse_quote_response(body, &symbol).expect("must parse");
        assert_eq!(snapshot.market_cap, 0.0);
        assert_eq!(snapshot.daily_volume, 0);
    }
}
