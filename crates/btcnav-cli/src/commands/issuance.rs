use btcnav_core::{
    issuance, report, valuation, AnalysisConfig, AtmEstimate, CommonIssuanceEstimate,
    PreferredAtmParams, SourceStack, Symbol, TreasuryState,
};
use serde::Serialize;

use crate::cli::IssuanceArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct IssuanceResponseData {
    preferred_atm: AtmEstimate,
    common_issuance: CommonIssuanceEstimate,
}

pub async fn run(args: &IssuanceArgs, sources: &SourceStack) -> Result<CommandResult, CliError> {
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

    let defaults = config.preferred_atm;
    let params = PreferredAtmParams::new(
        args.threshold.unwrap_or(defaults.threshold),
        args.atm_fraction.unwrap_or(defaults.atm_fraction),
        args.commission_rate.unwrap_or(defaults.commission_rate),
    )?;

    let spot = gathered.inputs.treasury.btc_spot_price;
    let snapshot = &gathered.inputs.snapshot;
    let preferred_atm = issuance::preferred_atm(snapshot, &params, spot);

    let valued = valuation::valuation(&gathered.inputs.treasury, snapshot, &config.liabilities);
    let common_issuance = issuance::common_stock(valued.premium_to_nav, snapshot, spot);

    let data = serde_json::to_value(IssuanceResponseData {
        preferred_atm,
        common_issuance,
    })?;
    Ok(CommandResult::ok(data, gathered.source_chain)
        .with_warnings(gathered.warnings)
        .with_degraded(gathered.degraded))
}
