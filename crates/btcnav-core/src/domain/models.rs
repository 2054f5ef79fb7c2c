use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ReportDate, Symbol, UtcDateTime, ValidationError};

/// Capital instrument categories that finance bitcoin purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    CommonStock,
    ConvertibleDebt,
    Strc,
    Strk,
    Strd,
    Strf,
    Stre,
}

impl FundingSource {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::CommonStock,
        Self::ConvertibleDebt,
        Self::Strc,
        Self::Strk,
        Self::Strd,
        Self::Strf,
        Self::Stre,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommonStock => "common_stock",
            Self::ConvertibleDebt => "convertible_debt",
            Self::Strc => "strc",
            Self::Strk => "strk",
            Self::Strd => "strd",
            Self::Strf => "strf",
            Self::Stre => "stre",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::CommonStock => 0,
            Self::ConvertibleDebt => 1,
            Self::Strc => 2,
            Self::Strk => 3,
            Self::Strd => 4,
            Self::Strf => 5,
            Self::Stre => 6,
        }
    }
}

impl Display for FundingSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FundingSource {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "common_stock" => Ok(Self::CommonStock),
            "convertible_debt" => Ok(Self::ConvertibleDebt),
            "strc" => Ok(Self::Strc),
            "strk" => Ok(Self::Strk),
            "strd" => Ok(Self::Strd),
            "strf" => Ok(Self::Strf),
            "stre" => Ok(Self::Stre),
            other => Err(ValidationError::InvalidFundingSource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Dense per-source BTC (or weight) amounts, serialized as a keyed map.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SourceAmounts([f64; FundingSource::COUNT]);

impl SourceAmounts {
    pub const fn zero() -> Self {
        Self([0.0; FundingSource::COUNT])
    }

    pub const fn get(&self, source: FundingSource) -> f64 {
        self.0[source.index()]
    }

    pub fn set(&mut self, source: FundingSource, amount: f64) {
        self.0[source.index()] = amount;
    }

    pub fn add(&mut self, source: FundingSource, amount: f64) {
        self.0[source.index()] += amount;
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FundingSource, f64)> + '_ {
        FundingSource::ALL
            .into_iter()
            .map(move |source| (source, self.get(source)))
    }
}

impl FromIterator<(FundingSource, f64)> for SourceAmounts {
    fn from_iter<I: IntoIterator<Item = (FundingSource, f64)>>(iter: I) -> Self {
        let mut amounts = Self::zero();
        for (source, amount) in iter {
            amounts.add(source, amount);
        }
        amounts
    }
}

impl Serialize for SourceAmounts {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let map: BTreeMap<&'static str, f64> = self
            .iter()
            .map(|(source, amount)| (source.as_str(), amount))
            .collect();
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SourceAmounts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as DeError;

        let map = BTreeMap::<String, f64>::deserialize(deserializer)?;
        let mut amounts = Self::zero();
        for (key, amount) in map {
            let source = FundingSource::from_str(&key).map_err(D::Error::custom)?;
            amounts.set(source, amount);
        }
        Ok(amounts)
    }
}

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Per-source allocation weights, guaranteed to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AllocationWeights(SourceAmounts);

impl AllocationWeights {
    pub fn new(weights: SourceAmounts) -> Result<Self, ValidationError> {
        for (_, weight) in weights.iter() {
            if !weight.is_finite() {
                return Err(ValidationError::NonFiniteValue { field: "weight" });
            }
            if weight < 0.0 {
                return Err(ValidationError::NegativeValue { field: "weight" });
            }
        }

        let sum = weights.total();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightsDoNotSumToOne { sum });
        }

        Ok(Self(weights))
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (FundingSource, f64)>,
    ) -> Result<Self, ValidationError> {
        Self::new(pairs.into_iter().collect())
    }

    pub const fn get(&self, source: FundingSource) -> f64 {
        self.0.get(source)
    }

    pub const fn amounts(&self) -> SourceAmounts {
        self.0
    }
}

/// Equity quote snapshot for the ticker under analysis.
///
/// Constructed fresh per query and discarded after use. `high >= low` is
/// enforced; the last price landing inside the day range is not, because
/// upstream feeds do violate it and the consumers tolerate that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: Symbol,
    pub market_cap: f64,
    pub shares_outstanding: u64,
    pub last_price: f64,
    pub daily_volume: u64,
    pub high: f64,
    pub low: f64,
    pub as_of: UtcDateTime,
}

impl MarketSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: Symbol,
        market_cap: f64,
        shares_outstanding: u64,
        last_price: f64,
        daily_volume: u64,
        high: f64,
        low: f64,
        as_of: UtcDateTime,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("market_cap", market_cap)?;
        validate_non_negative("last_price", last_price)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;

        if high < low {
            return Err(ValidationError::InvalidDayRange);
        }

        Ok(Self {
            symbol,
            market_cap,
            shares_outstanding,
            last_price,
            daily_volume,
            high,
            low,
            as_of,
        })
    }

    /// Degenerate fallback snapshot used when the quote provider fails.
    /// Downstream ratios computed from it collapse to their defined-zero
    /// or absent values.
    pub fn zeroed(symbol: Symbol) -> Self {
        Self {
            symbol,
            market_cap: 0.0,
            shares_outstanding: 0,
            last_price: 0.0,
            daily_volume: 0,
            high: 0.0,
            low: 0.0,
            as_of: UtcDateTime::now(),
        }
    }
}

/// Current bitcoin treasury position and spot price. Immutable per run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreasuryState {
    pub btc_held: f64,
    pub btc_spot_price: f64,
}

impl TreasuryState {
    pub fn new(btc_held: f64, btc_spot_price: f64) -> Result<Self, ValidationError> {
        validate_non_negative("btc_held", btc_held)?;
        validate_non_negative("btc_spot_price", btc_spot_price)?;
        Ok(Self {
            btc_held,
            btc_spot_price,
        })
    }
}

/// Approximate balance-sheet adjustment taken from recent filings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiabilityAssumptions {
    pub debt: f64,
    pub preferred_notional: f64,
    pub cash_reserves: f64,
}

impl LiabilityAssumptions {
    pub fn new(
        debt: f64,
        preferred_notional: f64,
        cash_reserves: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("debt", debt)?;
        validate_non_negative("preferred_notional", preferred_notional)?;
        validate_non_negative("cash_reserves", cash_reserves)?;
        Ok(Self {
            debt,
            preferred_notional,
            cash_reserves,
        })
    }

    /// May be negative when reserves exceed obligations.
    pub fn net_liabilities(&self) -> f64 {
        self.debt + self.preferred_notional - self.cash_reserves
    }
}

impl Default for LiabilityAssumptions {
    fn default() -> Self {
        Self {
            debt: 8_000_000_000.0,
            preferred_notional: 8_000_000_000.0,
            cash_reserves: 2_190_000_000.0,
        }
    }
}

/// One historical bitcoin-purchase disclosure event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub report_date: ReportDate,
    pub btc_acquired: f64,
    pub cumulative_btc: f64,
}

impl PurchaseRecord {
    pub fn new(
        report_date: ReportDate,
        btc_acquired: f64,
        cumulative_btc: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("btc_acquired", btc_acquired)?;
        validate_non_negative("cumulative_btc", cumulative_btc)?;
        Ok(Self {
            report_date,
            btc_acquired,
            cumulative_btc,
        })
    }
}

/// A purchase (historical or forecast) enriched with per-source allocation
/// and per-source running cumulative totals. Computed once at construction,
/// never updated in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub report_date: ReportDate,
    pub btc_acquired: f64,
    pub cumulative_btc: f64,
    pub allocation: SourceAmounts,
    pub cumulative_by_source: SourceAmounts,
    pub projected: bool,
}

/// Derived valuation metrics for one run.
///
/// `premium_to_nav` is `None` when `nav <= 0`: the ratio has no meaningful
/// value there, and callers must not read it as "trading at zero premium".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub treasury_value: f64,
    pub btc_per_share: f64,
    pub enterprise_value: f64,
    pub leverage_amplification: f64,
    pub nav: f64,
    pub premium_to_nav: Option<f64>,
}

pub(crate) fn validate_non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

pub(crate) fn validate_fraction(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::FractionOutOfRange { field, value });
    }
    Ok(())
}
