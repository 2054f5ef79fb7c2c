//! Forward projection of annual bitcoin acquisitions.
//!
//! A power-law price curve (`price = 10^a * years^b`, years measured from
//! the genesis epoch) converts a fixed annual capital budget into projected
//! coin amounts at each future year-end, and the forecast allocation
//! weights extend the per-source cumulative series from the historical tail.

use crate::{
    AllocationWeights, ForecastError, FundingSource, LedgerEntry, ReportDate, SourceAmounts,
    ValidationError,
};

/// Deterministic price-vs-time curve `10^a * years^b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLawModel {
    pub exponent_a: f64,
    pub exponent_b: f64,
    pub epoch: ReportDate,
}

impl PowerLawModel {
    pub const DEFAULT_EXPONENT_A: f64 = -1.847796462;
    pub const DEFAULT_EXPONENT_B: f64 = 5.616314045;

    /// Projected price at `date`, or `None` when the date does not lie
    /// strictly after the epoch or the curve degenerates.
    pub fn projected_price(&self, date: ReportDate) -> Option<f64> {
        let years = date.days_since(self.epoch) as f64 / 365.25;
        if years <= 0.0 {
            return None;
        }

        let price = 10f64.powf(self.exponent_a) * years.powf(self.exponent_b);
        (price.is_finite() && price > 0.0).then_some(price)
    }
}

impl Default for PowerLawModel {
    fn default() -> Self {
        Self {
            exponent_a: Self::DEFAULT_EXPONENT_A,
            exponent_b: Self::DEFAULT_EXPONENT_B,
            // Genesis block date, the earliest plausible origin of the curve.
            epoch: ReportDate::from_date(time::macros::date!(2009 - 01 - 03)),
        }
    }
}

/// Forecast horizon, deployment budget, and allocation mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    pub horizon_years: u32,
    pub annual_budget_usd: f64,
    pub weights: AllocationWeights,
    pub model: PowerLawModel,
}

impl ForecastConfig {
    pub const DEFAULT_HORIZON_YEARS: u32 = 10;
    pub const DEFAULT_ANNUAL_BUDGET_USD: f64 = 10_000_000_000.0;

    pub fn new(
        horizon_years: u32,
        annual_budget_usd: f64,
        weights: AllocationWeights,
        model: PowerLawModel,
    ) -> Result<Self, ValidationError> {
        if horizon_years == 0 {
            return Err(ValidationError::EmptyHorizon);
        }
        crate::domain::validate_non_negative("annual_budget_usd", annual_budget_usd)?;

        Ok(Self {
            horizon_years,
            annual_budget_usd,
            weights,
            model,
        })
    }

    /// Forward allocation mix: common-stock trimmed to 0.3, convertible
    /// debt to 0.1, the rest spread evenly over the preferred classes.
    pub fn default_weights() -> AllocationWeights {
        AllocationWeights::from_pairs([
            (FundingSource::CommonStock, 0.3),
            (FundingSource::ConvertibleDebt, 0.1),
            (FundingSource::Strc, 0.12),
            (FundingSource::Strk, 0.12),
            (FundingSource::Strd, 0.12),
            (FundingSource::Strf, 0.12),
            (FundingSource::Stre, 0.12),
        ])
        .expect("forecast weights sum to 1.0")
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_years: Self::DEFAULT_HORIZON_YEARS,
            annual_budget_usd: Self::DEFAULT_ANNUAL_BUDGET_USD,
            weights: Self::default_weights(),
            model: PowerLawModel::default(),
        }
    }
}

/// Generate forecast ledger entries for the year-ends after `last`,
/// chaining totals from its cumulative columns.
///
/// # Errors
///
/// Returns [`ForecastError::NonPositivePrice`] if the model cannot produce
/// a usable price for some horizon date. With the default calibration this
/// cannot happen for dates after the epoch, but the division is guarded
/// regardless.
pub fn extend(last: &LedgerEntry, config: &ForecastConfig) -> Result<Vec<LedgerEntry>, ForecastError> {
    let mut cumulative_by_source = last.cumulative_by_source;
    let mut cumulative_btc = last.cumulative_btc;
    let first_year = last.report_date.year() + 1;
    let mut entries = Vec::with_capacity(config.horizon_years as usize);

    for year in first_year..first_year + config.horizon_years as i32 {
        let date = ReportDate::year_end(year).map_err(|_| ForecastError::NonPositivePrice {
            date: format!("{year}-12-31"),
        })?;

        let price = config
            .model
            .projected_price(date)
            .ok_or_else(|| ForecastError::NonPositivePrice {
                date: date.format_iso(),
            })?;

        let btc_acquired = config.annual_budget_usd / price;
        cumulative_btc += btc_acquired;

        let mut allocation = SourceAmounts::zero();
        for source in FundingSource::ALL {
            let amount = btc_acquired * config.weights.get(source);
            allocation.set(source, amount);
            cumulative_by_source.add(source, amount);
        }

        entries.push(LedgerEntry {
            report_date: date,
            btc_acquired,
            cumulative_btc,
            allocation,
            cumulative_by_source,
            projected: true,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn historical_tail() -> LedgerEntry {
        let mut cumulative_by_source = SourceAmounts::zero();
        cumulative_by_source.set(FundingSource::CommonStock, 400_000.0);
        cumulative_by_source.set(FundingSource::ConvertibleDebt, 287_410.0);

        LedgerEntry {
            report_date: ReportDate::parse("2025-12-29").expect("valid date"),
            btc_acquired: 90_290.0,
            cumulative_btc: 687_410.0,
            allocation: SourceAmounts::zero(),
            cumulative_by_source,
            projected: false,
        }
    }

    #[test]
    fn power_law_price_grows_with_time() {
        let model = PowerLawModel::default();
        let early = model
            .projected_price(ReportDate::parse("2026-12-31").expect("valid date"))
            .expect("price is defined");
        let late = model
            .projected_price(ReportDate::parse("2030-12-31").expect("valid date"))
            .expect("price is defined");

        assert!(early > 0.0);
        assert!(late > early);
    }

    #[test]
    fn price_is_undefined_at_or_before_epoch() {
        let model = PowerLawModel::default();
        assert_eq!(
            model.projected_price(ReportDate::parse("2009-01-03").expect("valid date")),
            None
        );
        assert_eq!(
            model.projected_price(ReportDate::parse("2008-06-01").expect("valid date")),
            None
        );
    }

    #[test]
    fn forecast_emits_one_entry_per_year_end() {
        let entries = extend(&historical_tail(), &ForecastConfig::default())
            .expect("forecast should succeed");

        assert_eq!(entries.len(), 10);
        assert_eq!(entries[0].report_date.format_iso(), "2026-12-31");
        assert_eq!(entries[9].report_date.format_iso(), "2035-12-31");
        assert!(entries.iter().all(|entry| entry.projected));
    }

    #[test]
    fn first_forecast_year_strictly_grows_the_total() {
        let tail = historical_tail();
        let entries =
            extend(&tail, &ForecastConfig::default()).expect("forecast should succeed");

        assert!(entries[0].cumulative_btc > tail.cumulative_btc);
        assert!(entries[0].report_date > tail.report_date);
    }

    #[test]
    fn per_source_series_is_non_decreasing() {
        let tail = historical_tail();
        let entries =
            extend(&tail, &ForecastConfig::default()).expect("forecast should succeed");

        let mut previous = tail.cumulative_by_source;
        for entry in &entries {
            for source in FundingSource::ALL {
                assert!(entry.cumulative_by_source.get(source) >= previous.get(source));
            }
            previous = entry.cumulative_by_source;
        }
    }

    #[test]
    fn yearly_acquisition_shrinks_as_price_rises() {
        let entries = extend(&historical_tail(), &ForecastConfig::default())
            .expect("forecast should succeed");

        for pair in entries.windows(2) {
            assert!(pair[1].btc_acquired < pair[0].btc_acquired);
        }
    }
}
