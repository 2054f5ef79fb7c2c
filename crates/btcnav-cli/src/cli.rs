//! CLI argument definitions for btcnav.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `report` | Full treasury analysis report |
//! | `valuation` | Treasury valuation metrics only |
//! | `ledger` | Funding attribution ledger with optional forecast |
//! | `issuance` | Preferred ATM and common-stock issuance estimates |
//! | `sources` | List data source capabilities and health |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--live` | `false` | Hit real provider APIs instead of offline data |
//! | `--timeout-ms` | `10000` | Overall command timeout in ms |

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Bitcoin treasury analytics CLI.
///
/// Values a bitcoin-holding public company against its treasury, attributes
/// historical purchases to funding sources, and projects future acquisition
/// under a power-law price model.
#[derive(Debug, Parser)]
#[command(
    name = "btcnav",
    author,
    version,
    about = "Bitcoin treasury analytics CLI"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Query live provider APIs. Without this flag every command runs
    /// against deterministic offline data.
    #[arg(long, global = true, default_value_t = false)]
    pub live: bool,

    /// Overall command timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Full treasury analysis report.
    ///
    /// Gathers spot price, equity quote, holdings, and purchase history,
    /// then derives valuation, the attributed ledger with forecast, and
    /// both issuance estimates in one envelope.
    ///
    /// # Examples
    ///
    ///   btcnav report
    ///   btcnav report --symbol MSTR --pretty
    ///   btcnav report --annual-budget 5e9 --horizon-years 5
    Report(ReportArgs),

    /// Treasury valuation metrics only.
    ///
    /// # Examples
    ///
    ///   btcnav valuation
    ///   btcnav valuation --spot-price 100000 --holdings 700000
    Valuation(ValuationArgs),

    /// Funding attribution ledger, optionally extended with the forecast.
    ///
    /// # Examples
    ///
    ///   btcnav ledger
    ///   btcnav ledger --forecast --horizon-years 10
    Ledger(LedgerArgs),

    /// Preferred ATM and common-stock issuance estimates.
    ///
    /// # Examples
    ///
    ///   btcnav issuance
    ///   btcnav issuance --threshold 120 --atm-fraction 0.25
    Issuance(IssuanceArgs),

    /// List data source capability matrix and health.
    Sources(SourcesArgs),
}

/// Market and treasury input overrides shared by several commands.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Equity ticker of the treasury company.
    #[arg(long, default_value = "MSTR")]
    pub symbol: String,

    /// Company name used for treasury-tracker lookups.
    #[arg(long, default_value = "MicroStrategy")]
    pub company: String,

    /// Override the bitcoin spot price in USD.
    #[arg(long)]
    pub spot_price: Option<f64>,

    /// Override the bitcoin holdings in BTC.
    #[arg(long)]
    pub holdings: Option<f64>,
}

/// Arguments for the `report` command.
#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Annual deployment budget for the forecast, in USD.
    #[arg(long)]
    pub annual_budget: Option<f64>,

    /// Forecast horizon in years.
    #[arg(long)]
    pub horizon_years: Option<u32>,
}

/// Arguments for the `valuation` command.
#[derive(Debug, Args)]
pub struct ValuationArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Override total debt in USD.
    #[arg(long)]
    pub debt: Option<f64>,

    /// Override preferred equity notional in USD.
    #[arg(long)]
    pub preferred_notional: Option<f64>,

    /// Override cash reserves in USD.
    #[arg(long)]
    pub cash_reserves: Option<f64>,
}

/// Arguments for the `ledger` command.
#[derive(Debug, Args)]
pub struct LedgerArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Extend the historical ledger with forecast entries.
    #[arg(long, default_value_t = false)]
    pub forecast: bool,

    /// Forecast horizon in years (only with --forecast).
    #[arg(long)]
    pub horizon_years: Option<u32>,

    /// Annual deployment budget for the forecast, in USD.
    #[arg(long)]
    pub annual_budget: Option<f64>,
}

/// Arguments for the `issuance` command.
#[derive(Debug, Args)]
pub struct IssuanceArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Preferred ATM price threshold in USD.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Fraction of above-threshold volume issued through the ATM.
    #[arg(long)]
    pub atm_fraction: Option<f64>,

    /// Underwriting commission rate.
    #[arg(long)]
    pub commission_rate: Option<f64>,
}

/// Arguments for the `sources` command.
#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Include per-endpoint capability detail.
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}
