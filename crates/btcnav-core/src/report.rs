//! Report assembly: gather inputs from the source stack, then derive the
//! full analysis from them in one pure pass.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::attribution::{self, AllocationSchedule};
use crate::fallback::FallbackPolicy;
use crate::forecast::{self, ForecastConfig};
use crate::issuance::{self, AtmEstimate, CommonIssuanceEstimate, PreferredAtmParams};
use crate::providers::{
    CoingeckoAdapter, DataSource, HistoryRequest, HoldingsRequest, ProviderId, QuoteRequest,
    SourceError, TreasuriesAdapter, YahooAdapter,
};
use crate::valuation;
use crate::{
    ForecastError, LedgerEntry, LedgerError, LiabilityAssumptions, MarketSnapshot, PurchaseRecord,
    Symbol, TreasuryState, ValuationResult,
};

/// Everything a report run needs beyond live inputs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub liabilities: LiabilityAssumptions,
    pub fallback: FallbackPolicy,
    pub schedule: AllocationSchedule,
    pub forecast: ForecastConfig,
    pub preferred_atm: PreferredAtmParams,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            liabilities: LiabilityAssumptions::default(),
            fallback: FallbackPolicy::default(),
            schedule: AllocationSchedule::default(),
            forecast: ForecastConfig::default(),
            preferred_atm: PreferredAtmParams::default(),
        }
    }
}

/// Resolved inputs for one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInputs {
    pub treasury: TreasuryState,
    pub snapshot: MarketSnapshot,
    pub history: Vec<PurchaseRecord>,
}

/// Inputs plus the provenance of how they were obtained.
#[derive(Debug, Clone)]
pub struct GatheredInputs {
    pub inputs: ReportInputs,
    pub source_chain: Vec<ProviderId>,
    pub warnings: Vec<String>,
    pub degraded: bool,
}

#[derive(Debug, Error)]
pub enum ReportError {
    /// Spot price or equity market cap is unusable and has no fallback.
    #[error("primary inputs unavailable: {reason}")]
    PrimaryInputsUnavailable { reason: String },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error("source failure: {0}")]
    Source(SourceError),
}

impl ReportError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PrimaryInputsUnavailable { .. } => "report.primary_inputs_unavailable",
            Self::Ledger(_) => "report.ledger_invalid",
            Self::Forecast(_) => "report.forecast_failed",
            Self::Source(_) => "report.source_failure",
        }
    }
}

impl From<SourceError> for ReportError {
    fn from(error: SourceError) -> Self {
        Self::Source(error)
    }
}

/// The sources a report run draws from, one per concern.
#[derive(Clone)]
pub struct SourceStack {
    pub spot: Arc<dyn DataSource>,
    pub equity: Arc<dyn DataSource>,
    pub treasury: Arc<dyn DataSource>,
}

impl SourceStack {
    /// Offline stack: deterministic adapters, no network traffic.
    pub fn offline() -> Self {
        Self {
            spot: Arc::new(CoingeckoAdapter::default()),
            equity: Arc::new(YahooAdapter::default()),
            treasury: Arc::new(TreasuriesAdapter::default()),
        }
    }

    /// Live stack sharing one HTTP client across all adapters.
    pub fn live(http_client: Arc<dyn crate::HttpClient>) -> Self {
        Self {
            spot: Arc::new(CoingeckoAdapter::with_http_client(http_client.clone())),
            equity: Arc::new(YahooAdapter::with_http_client(http_client.clone())),
            treasury: Arc::new(TreasuriesAdapter::with_http_client(
                http_client,
                crate::providers::TREASURIES_ENDPOINT_URL,
            )),
        }
    }
}

/// The complete analysis product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryReport {
    pub inputs: ReportInputs,
    pub valuation: ValuationResult,
    pub ledger: Vec<LedgerEntry>,
    pub preferred_atm: AtmEstimate,
    pub common_issuance: CommonIssuanceEstimate,
}

/// Resolve all report inputs from the source stack.
///
/// Holdings and purchase history degrade to the fallback policy when their
/// source fails, and a quote failure degrades to [`MarketSnapshot::zeroed`];
/// only the spot price has no fallback, so its failure propagates to the
/// caller as [`ReportError::Source`].
pub async fn gather_inputs(
    sources: &SourceStack,
    symbol: &Symbol,
    company: &str,
    fallback: &FallbackPolicy,
) -> Result<GatheredInputs, ReportError> {
    let mut source_chain = Vec::new();
    let mut warnings = Vec::new();
    let mut degraded = false;

    let spot = sources.spot.spot_price().await?;
    source_chain.push(sources.spot.id());

    let snapshot = match sources.equity.quote(QuoteRequest::new(symbol.clone())).await {
        Ok(snapshot) => {
            source_chain.push(sources.equity.id());
            snapshot
        }
        Err(error) => {
            degraded = true;
            warnings.push(format!(
                "quote unavailable from {}, using zeroed snapshot for {}: {}",
                sources.equity.id(),
                symbol,
                error.message()
            ));
            MarketSnapshot::zeroed(symbol.clone())
        }
    };

    let holdings_req = HoldingsRequest::new(company)?;
    let btc_held = match sources.treasury.holdings(holdings_req).await {
        Ok(holdings) => {
            source_chain.push(sources.treasury.id());
            holdings.btc
        }
        Err(error) => {
            degraded = true;
            warnings.push(format!(
                "holdings unavailable from {}, using fallback of {} BTC: {}",
                sources.treasury.id(),
                fallback.holdings_btc,
                error.message()
            ));
            fallback.holdings_btc
        }
    };

    let history_req = HistoryRequest::new(company)?;
    let history = match sources.treasury.purchase_history(history_req).await {
        Ok(batch) => {
            if !source_chain.contains(&sources.treasury.id()) {
                source_chain.push(sources.treasury.id());
            }
            batch.records
        }
        Err(error) => {
            degraded = true;
            warnings.push(format!(
                "purchase history unavailable from {}, using sample ledger: {}",
                sources.treasury.id(),
                error.message()
            ));
            fallback.sample_ledger()
        }
    };

    let treasury = TreasuryState::new(btc_held, spot.usd).map_err(|error| {
        ReportError::PrimaryInputsUnavailable {
            reason: error.to_string(),
        }
    })?;

    Ok(GatheredInputs {
        inputs: ReportInputs {
            treasury,
            snapshot,
            history,
        },
        source_chain,
        warnings,
        degraded,
    })
}

/// Assemble the full report from resolved inputs. Pure and deterministic.
///
/// # Errors
///
/// Fails with [`ReportError::PrimaryInputsUnavailable`] when the spot price
/// or market cap is not positive; no partial report is produced in that
/// case. Ledger and forecast errors propagate unchanged.
pub fn build_report(
    inputs: ReportInputs,
    config: &AnalysisConfig,
) -> Result<TreasuryReport, ReportError> {
    if inputs.treasury.btc_spot_price <= 0.0 {
        return Err(ReportError::PrimaryInputsUnavailable {
            reason: format!(
                "bitcoin spot price {} is not positive",
                inputs.treasury.btc_spot_price
            ),
        });
    }

    if inputs.snapshot.market_cap <= 0.0 {
        return Err(ReportError::PrimaryInputsUnavailable {
            reason: format!(
                "market cap {} for {} is not positive",
                inputs.snapshot.market_cap, inputs.snapshot.symbol
            ),
        });
    }

    let valuation = valuation::valuation(&inputs.treasury, &inputs.snapshot, &config.liabilities);

    let mut ledger = attribution::attribute(&inputs.history, &config.schedule)?;
    if let Some(last) = ledger.last() {
        let projected = forecast::extend(last, &config.forecast)?;
        ledger.extend(projected);
    }

    let preferred_atm = issuance::preferred_atm(
        &inputs.snapshot,
        &config.preferred_atm,
        inputs.treasury.btc_spot_price,
    );
    let common_issuance = issuance::common_stock(
        valuation.premium_to_nav,
        &inputs.snapshot,
        inputs.treasury.btc_spot_price,
    );

    Ok(TreasuryReport {
        inputs,
        valuation,
        ledger,
        preferred_atm,
        common_issuance,
    })
}
