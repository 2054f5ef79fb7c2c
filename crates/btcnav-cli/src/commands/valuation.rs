use btcnav_core::{
    report, valuation, AnalysisConfig, LiabilityAssumptions, SourceStack, Symbol, TreasuryState,
};

use crate::cli::ValuationArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &ValuationArgs, sources: &SourceStack) -> Result<CommandResult, CliError> {
    let symbol = Symbol::parse(&args.inputs.symbol)?;
    let config = AnalysisConfig::default();

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

    let defaults = config.liabilities;
    let liabilities = LiabilityAssumptions::new(
        args.debt.unwrap_or(defaults.debt),
        args.preferred_notional.unwrap_or(defaults.preferred_notional),
        args.cash_reserves.unwrap_or(defaults.cash_reserves),
    )?;

    let result = valuation::valuation(
        &gathered.inputs.treasury,
        &gathered.inputs.snapshot,
        &liabilities,
    );

    let data = serde_json::to_value(&result)?;
    Ok(CommandResult::ok(data, gathered.source_chain)
        .with_warnings(gathered.warnings)
        .with_degraded(gathered.degraded))
}
