use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::providers::{
    CapabilitySet, DataSource, HealthState, HealthStatus, HistoryBatch, HistoryRequest, Holdings,
    HoldingsRequest, ProviderId, QuoteRequest, SourceError, SpotPrice,
};
use crate::{MarketSnapshot, UtcDateTime};

const SIMPLE_PRICE_ENDPOINT: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd";

/// Fixture price served in offline mode.
const OFFLINE_SPOT_PRICE_USD: f64 = 95_000.0;

/// CoinGecko adapter: bitcoin spot price only.
#[derive(Clone)]
pub struct CoingeckoAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    use_real_api: bool,
}

impl Default for CoingeckoAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            use_real_api: false,
        }
    }
}

impl CoingeckoAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            use_real_api,
            ..Self::default()
        }
    }

    async fn fetch_spot(&self) -> Result<SpotPrice, SourceError> {
        if !self.use_real_api {
            return Ok(SpotPrice {
                usd: OFFLINE_SPOT_PRICE_USD,
                as_of: UtcDateTime::now(),
            });
        }

        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(
                "coingecko circuit breaker is open",
            ));
        }

        let request = HttpRequest::get(SIMPLE_PRICE_ENDPOINT)
            .with_header("accept", "application/json")
            .with_timeout_ms(10_000);

        let response = self.http_client.execute(request).await.map_err(|e| {
            self.circuit_breaker.record_failure();
            SourceError::unavailable(format!("coingecko transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(SourceError::unavailable(format!(
                "coingecko returned status {}",
                response.status
            )));
        }

        self.circuit_breaker.record_success();
        parse_simple_price(&response.body)
    }
}

fn parse_simple_price(body: &str) -> Result<SpotPrice, SourceError> {
    let payload: SimplePriceResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::malformed_data(format!("coingecko payload: {e}")))?;

    let usd = payload.bitcoin.usd;
    if !usd.is_finite() || usd < 0.0 {
        return Err(SourceError::malformed_data(format!(
            "coingecko price is not a valid amount: {usd}"
        )));
    }

    Ok(SpotPrice {
        usd,
        as_of: UtcDateTime::now(),
    })
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: SimplePriceEntry,
}

#[derive(Debug, Deserialize)]
struct SimplePriceEntry {
    usd: f64,
}

impl DataSource for CoingeckoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Coingecko
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(true, false, false, false)
    }

    fn spot_price<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SpotPrice, SourceError>> + Send + 'a>> {
        Box::pin(async move { self.fetch_spot().await })
    }

    fn holdings<'a>(
        &'a self,
        _req: HoldingsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Holdings, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                crate::providers::Endpoint::Holdings,
            ))
        })
    }

    fn quote<'a>(
        &'a self,
        _req: QuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                crate::providers::Endpoint::Quote,
            ))
        })
    }

    fn purchase_history<'a>(
        &'a self,
        _req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                crate::providers::Endpoint::PurchaseHistory,
            ))
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
