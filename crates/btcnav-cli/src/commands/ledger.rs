use btcnav_core::{
    attribution, forecast, AllocationSchedule, AnalysisConfig, FallbackPolicy,
    HistoryRequest, LedgerEntry, ReportError, SourceStack,
};
use serde::Serialize;

use crate::cli::LedgerArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct LedgerResponseData {
    entries: Vec<LedgerEntry>,
}

pub async fn run(args: &LedgerArgs, sources: &SourceStack) -> Result<CommandResult, CliError> {
    let mut config = AnalysisConfig::default();
    super::apply_forecast_overrides(&mut config, args.horizon_years, args.annual_budget)?;

    let fallback = FallbackPolicy::default();
    let mut warnings = Vec::new();
    let mut degraded = false;

    let request = HistoryRequest::new(&args.inputs.company)
        .map_err(|error| CliError::Command(error.to_string()))?;
    let history = match sources.treasury.purchase_history(request).await {
        Ok(batch) => batch.records,
        Err(error) => {
            degraded = true;
            warnings.push(format!(
                "purchase history unavailable, using sample ledger: {}",
                error.message()
            ));
            fallback.sample_ledger()
        }
    };

    let schedule = AllocationSchedule::default();
    let mut entries = match attribution::attribute(&history, &schedule) {
        Ok(entries) => entries,
        Err(error) => return super::failure_result(&ReportError::from(error), sources),
    };

    if args.forecast {
        if let Some(last) = entries.last() {
            match forecast::extend(last, &config.forecast) {
                Ok(projected) => entries.extend(projected),
                Err(error) => return super::failure_result(&ReportError::from(error), sources),
            }
        }
    }

    let data = serde_json::to_value(LedgerResponseData { entries })?;
    Ok(
        CommandResult::ok(data, vec![sources.treasury.id()])
            .with_warnings(warnings)
            .with_degraded(degraded),
    )
}
