mod date;
mod models;
mod symbol;

pub use date::{ReportDate, UtcDateTime};
pub use models::{
    AllocationWeights, FundingSource, LedgerEntry, LiabilityAssumptions, MarketSnapshot,
    PurchaseRecord, SourceAmounts, TreasuryState, ValuationResult,
};
pub(crate) use models::{validate_fraction, validate_non_negative};
pub use symbol::Symbol;
