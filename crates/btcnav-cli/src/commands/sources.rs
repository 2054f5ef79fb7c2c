use btcnav_core::{DataSource, HealthStatus, ProviderId, SourceStack};
use serde::Serialize;

use crate::cli::SourcesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourceStatus {
    id: ProviderId,
    health: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    capabilities: Option<Vec<&'static str>>,
}

#[derive(Debug, Serialize)]
struct SourcesResponseData {
    sources: Vec<SourceStatus>,
}

pub async fn run(args: &SourcesArgs, sources: &SourceStack) -> Result<CommandResult, CliError> {
    let adapters: [&dyn DataSource; 3] = [
        sources.spot.as_ref(),
        sources.equity.as_ref(),
        sources.treasury.as_ref(),
    ];

    let mut statuses = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        let health = adapter.health().await;
        let capabilities = args
            .verbose
            .then(|| adapter.capabilities().supported_endpoints());
        statuses.push(SourceStatus {
            id: adapter.id(),
            health,
            capabilities,
        });
    }

    let source_chain = statuses.iter().map(|status| status.id).collect();
    let data = serde_json::to_value(SourcesResponseData { sources: statuses })?;

    Ok(CommandResult::ok(data, source_chain))
}
