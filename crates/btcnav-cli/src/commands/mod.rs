mod issuance;
mod ledger;
mod report;
mod sources;
mod valuation;

use std::sync::Arc;
use std::time::{Duration, Instant};

use btcnav_core::{
    AnalysisConfig, Envelope, EnvelopeError, ForecastConfig, ProviderId, ReportError,
    ReqwestHttpClient, SourceStack,
};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub degraded: bool,
    pub source_chain: Vec<ProviderId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<ProviderId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            degraded: false,
            source_chain,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let sources = if cli.live {
        SourceStack::live(Arc::new(ReqwestHttpClient::default()))
    } else {
        SourceStack::offline()
    };

    let started = Instant::now();
    let dispatch = async {
        match &cli.command {
            Command::Report(args) => report::run(args, &sources).await,
            Command::Valuation(args) => valuation::run(args, &sources).await,
            Command::Ledger(args) => ledger::run(args, &sources).await,
            Command::Issuance(args) => issuance::run(args, &sources).await,
            Command::Sources(args) => sources::run(args, &sources).await,
        }
    };

    let command_result = tokio::time::timeout(Duration::from_millis(cli.timeout_ms), dispatch)
        .await
        .map_err(|_| CliError::Timeout {
            timeout_ms: cli.timeout_ms,
        })??;
    let latency_ms = started.elapsed().as_millis() as u64;

    let CommandResult {
        data,
        warnings,
        errors,
        degraded,
        source_chain,
    } = command_result;

    let mut metadata = Metadata::new(source_chain, latency_ms, degraded)?;
    for warning in warnings {
        metadata.push_warning(warning);
    }

    let meta = metadata.into_envelope_meta("v1.0.0")?;
    Envelope::with_errors(meta, data, errors).map_err(CliError::from)
}

/// Build a failure result carrying the error in the envelope body rather
/// than aborting the process; `main` maps non-empty errors to exit code 3.
pub fn failure_result(
    error: &ReportError,
    sources: &SourceStack,
) -> Result<CommandResult, CliError> {
    let retryable = matches!(error, ReportError::Source(source) if source.retryable());
    let envelope_error =
        EnvelopeError::new(error.code(), error.to_string())?.with_retryable(retryable);

    Ok(
        CommandResult::ok(Value::Null, attempted_chain(sources))
            .with_errors(vec![envelope_error])
            .with_degraded(true),
    )
}

fn attempted_chain(sources: &SourceStack) -> Vec<ProviderId> {
    vec![
        sources.spot.id(),
        sources.equity.id(),
        sources.treasury.id(),
    ]
}

/// Apply `--horizon-years` / `--annual-budget` overrides, revalidating the
/// forecast configuration.
pub fn apply_forecast_overrides(
    config: &mut AnalysisConfig,
    horizon_years: Option<u32>,
    annual_budget: Option<f64>,
) -> Result<(), CliError> {
    if horizon_years.is_none() && annual_budget.is_none() {
        return Ok(());
    }

    config.forecast = ForecastConfig::new(
        horizon_years.unwrap_or(config.forecast.horizon_years),
        annual_budget.unwrap_or(config.forecast.annual_budget_usd),
        config.forecast.weights,
        config.forecast.model,
    )?;

    Ok(())
}
