use btcnav_core::{report, AnalysisConfig, SourceStack, Symbol, TreasuryState};

use crate::cli::ReportArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &ReportArgs, sources: &SourceStack) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.inputs.symbol)?;
    let mut config = AnalysisConfig::default();
    super::apply_forecast_overrides(&mut config, args.horizon_years, args.annual_budget)?;

    let mut gathered = match report::gather_inputs(
        sources,
        &symbol,
        &args.inputs.company,
        &config.fallback,
    )
    .await
    {
        Ok(gathered) => gathered,
        Err(error) => return super::failure_result(&error, sources),
    };

    if args.inputs.spot_price.is_some() || args.inputs.holdings.is_some() {
        let btc_held = args
            .inputs
            .holdings
            .unwrap_or(gathered.inputs.treasury.btc_held);
        let spot = args
            .inputs
            .spot_price
            .unwrap_or(gathered.inputs.treasury.btc_spot_price);
        gathered.inputs.treasury = TreasuryState::new(btc_held, spot)?;
    }

    match report::build_report(gathered.inputs, &config) {
        Ok(treasury_report) => {
            let data = serde_json::to_value(&treasury_report)?;
            Ok(CommandResult::ok(data, gathered.source_chain)
                .with_warnings(gathered.warnings)
                .with_degraded(gathered.degraded))
        }
        Err(error) => super::failure_result(&error, sources),
    }
}
