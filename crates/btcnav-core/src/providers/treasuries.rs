use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::fallback::FallbackPolicy;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::providers::{
    CapabilitySet, DataSource, Endpoint, HealthState, HealthStatus, HistoryBatch, HistoryRequest,
    Holdings, HoldingsRequest, ProviderId, QuoteRequest, SourceError, SpotPrice,
};
use crate::{MarketSnapshot, PurchaseRecord, ReportDate, UtcDateTime};

pub const DEFAULT_ENDPOINT_URL: &str = "https://bitcointreasuries.example/api/companies";

/// Treasury-tracker adapter: company holdings and purchase history.
///
/// The upstream site publishes HTML tables; scraping them is outside the
/// core, so the live mode consumes a JSON mirror of the same data from a
/// configurable URL and reports anything else as malformed. Offline mode
/// serves the bundled sample ledger.
#[derive(Clone)]
pub struct TreasuriesAdapter {
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    endpoint_url: String,
    fallback: FallbackPolicy,
    use_real_api: bool,
}

impl Default for TreasuriesAdapter {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            circuit_breaker: Arc::new(CircuitBreaker::default()),
            endpoint_url: String::from(DEFAULT_ENDPOINT_URL),
            fallback: FallbackPolicy::default(),
            use_real_api: false,
        }
    }
}

impl TreasuriesAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, endpoint_url: impl Into<String>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            endpoint_url: endpoint_url.into(),
            use_real_api,
            ..Self::default()
        }
    }

    async fn fetch_document(&self, company: &str) -> Result<CompanyDocument, SourceError> {
        if !self.circuit_breaker.allow_request() {
            return Err(SourceError::unavailable(
                "treasuries circuit breaker is open",
            ));
        }

        let url = format!(
            "{}?company={}",
            self.endpoint_url,
            urlencoding::encode(company)
        );
        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(10_000);

        let response = self.http_client.execute(request).await.map_err(|e| {
            self.circuit_breaker.record_failure();
            SourceError::unavailable(format!("treasuries transport error: {}", e.message()))
        })?;

        if !response.is_success() {
            self.circuit_breaker.record_failure();
            return Err(SourceError::unavailable(format!(
                "treasuries returned status {}",
                response.status
            )));
        }

        self.circuit_breaker.record_success();
        parse_company_document(&response.body)
    }

    fn offline_history(&self) -> HistoryBatch {
        HistoryBatch {
            records: self.fallback.sample_ledger(),
        }
    }
}

fn parse_company_document(body: &str) -> Result<CompanyDocument, SourceError> {
    serde_json::from_str(body)
        .map_err(|e| SourceError::malformed_data(format!("treasuries payload: {e}")))
}

fn to_records(rows: Vec<PurchaseRow>) -> Result<Vec<PurchaseRecord>, SourceError> {
    rows.into_iter()
        .map(|row| {
            let date = ReportDate::parse(&row.report_date)
                .map_err(|e| SourceError::malformed_data(e.to_string()))?;
            PurchaseRecord::new(date, row.btc_acquired, row.cumulative_btc)
                .map_err(|e| SourceError::malformed_data(e.to_string()))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CompanyDocument {
    #[serde(rename = "totalBtc")]
    total_btc: f64,
    #[serde(default)]
    purchases: Vec<PurchaseRow>,
}

#[derive(Debug, Deserialize)]
struct PurchaseRow {
    #[serde(rename = "reportDate")]
    report_date: String,
    #[serde(rename = "btcAcquired")]
    btc_acquired: f64,
    #[serde(rename = "cumulativeBtc")]
    cumulative_btc: f64,
}

impl DataSource for TreasuriesAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Treasuries
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(false, true, false, true)
    }

    fn spot_price<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<SpotPrice, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported_endpoint(Endpoint::SpotPrice)) })
    }

    fn holdings<'a>(
        &'a self,
        req: HoldingsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Holdings, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.use_real_api {
                return Ok(Holdings {
                    btc: self.fallback.holdings_btc,
                    as_of: UtcDateTime::now(),
                });
            }

            let document = self.fetch_document(&req.company).await?;
            if !document.total_btc.is_finite() || document.total_btc < 0.0 {
                return Err(SourceError::malformed_data(format!(
                    "holdings is not a valid amount: {}",
                    document.total_btc
                )));
            }

            Ok(Holdings {
                btc: document.total_btc,
                as_of: UtcDateTime::now(),
            })
        })
    }

    fn quote<'a>(
        &'a self,
        _req: QuoteRequest,
    ) -> Pin<Box<dyn Future<Output = Result<MarketSnapshot, SourceError>> + Send + 'a>> {
        Box::pin(async move { Err(SourceError::unsupported_endpoint(Endpoint::Quote)) })
    }

    fn purchase_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HistoryBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.use_real_api {
                return Ok(self.offline_history());
            }

            let document = self.fetch_document(&req.company).await?;
            if document.purchases.is_empty() {
                return Err(SourceError::malformed_data(
                    "treasuries document has no purchase rows",
                ));
            }

            Ok(HistoryBatch {
                records: to_records(document.purchases)?,
            })
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
    fn parses_company_document() {
        let body = r#"{
            "totalBtc": 687410,
            "purchases": [
                {"reportDate": "2020-08-11", "btcAcquired": 21454, "cumulativeBtc": 21454}
            ]
        }"#;

        let document = parse_company_document(body).expect("must parse");
        assert_eq!(document.total_btc, 687_410.0);

        let records = to_records(document.purchases).expect("rows should convert");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].report_date.year(), 2020);
    }

    #[test]
    fn rejects_rows_with_bad_dates() {
        let rows = vec![PurchaseRow {
            report_date: String::from("Aug 11, 2020"),
            btc_acquired: 1.0,
            cumulative_btc: 1.0,
        }];

        let err = to_records(rows).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::MalformedData);
    }
}
