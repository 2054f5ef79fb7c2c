use thiserror::Error;

/// Validation and contract errors exposed by `btcnav-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be ISO-8601 calendar format (YYYY-MM-DD): '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("invalid funding source '{value}'")]
    InvalidFundingSource { value: String },
    #[error("invalid source '{value}', expected one of coingecko, treasuries, yahoo")]
    InvalidSource { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("field '{field}' must be a fraction in [0, 1]: {value}")]
    FractionOutOfRange { field: &'static str, value: f64 },

    #[error("snapshot high must be >= low")]
    InvalidDayRange,

    #[error("allocation weights must sum to 1.0, got {sum}")]
    WeightsDoNotSumToOne { sum: f64 },
    #[error("allocation schedule must contain at least one bucket")]
    EmptySchedule,
    #[error("allocation schedule bucket {index} has from_year > to_year")]
    InvertedBucketRange { index: usize },
    #[error("forecast horizon must be at least one year")]
    EmptyHorizon,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("schema_version must match vMAJOR.MINOR.PATCH: '{value}'")]
    InvalidSchemaVersion { value: String },
    #[error("source_chain must contain at least one source")]
    EmptySourceChain,
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Purchase-ledger precondition faults.
///
/// The attribution scan depends on date-ascending ordering and a
/// non-decreasing cumulative column; violations are surfaced, never
/// silently corrected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("purchase ledger is not sorted by report date at index {index}")]
    OutOfOrder { index: usize },
    #[error("cumulative btc decreases at index {index}")]
    NonMonotonicCumulative { index: usize },
    #[error("no allocation bucket covers year {year}")]
    NoBucketForYear { year: i32 },
}

/// Forecast generation faults.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("power-law model produced a non-positive price for {date}")]
    NonPositivePrice { date: String },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
