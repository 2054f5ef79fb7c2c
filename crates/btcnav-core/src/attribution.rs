//! Attribution of historical bitcoin purchases to funding sources.
//!
//! Each record's acquisition is split across the seven funding sources by
//! the allocation weights of the period bucket its report year falls into,
//! then per-source running totals are carried left to right. The schedule
//! is data, not branches, so the buckets can be recalibrated without
//! touching the scan.

use crate::{
    AllocationWeights, FundingSource, LedgerEntry, LedgerError, PurchaseRecord, SourceAmounts,
    ValidationError,
};

/// Allocation weights applied to report years in `[from_year, to_year]`.
/// `None` on either bound leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodBucket {
    pub from_year: Option<i32>,
    pub to_year: Option<i32>,
    pub weights: AllocationWeights,
}

impl PeriodBucket {
    pub fn new(
        from_year: Option<i32>,
        to_year: Option<i32>,
        weights: AllocationWeights,
    ) -> Self {
        Self {
            from_year,
            to_year,
            weights,
        }
    }

    fn covers(&self, year: i32) -> bool {
        self.from_year.is_none_or(|from| year >= from)
            && self.to_year.is_none_or(|to| year <= to)
    }
}

/// Ordered period buckets; the first bucket covering a year wins.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationSchedule {
    buckets: Vec<PeriodBucket>,
}

impl AllocationSchedule {
    pub fn new(buckets: Vec<PeriodBucket>) -> Result<Self, ValidationError> {
        if buckets.is_empty() {
            return Err(ValidationError::EmptySchedule);
        }

        for (index, bucket) in buckets.iter().enumerate() {
            if let (Some(from), Some(to)) = (bucket.from_year, bucket.to_year) {
                if from > to {
                    return Err(ValidationError::InvertedBucketRange { index });
                }
            }
        }

        Ok(Self { buckets })
    }

    pub fn weights_for_year(&self, year: i32) -> Option<&AllocationWeights> {
        self.buckets
            .iter()
            .find(|bucket| bucket.covers(year))
            .map(|bucket| &bucket.weights)
    }
}

impl Default for AllocationSchedule {
    /// The reference funding-mix history: convertible-debt heavy through
    /// 2022, common-stock heavy in 2023-2024, preferred classes from 2025.
    fn default() -> Self {
        let early = AllocationWeights::from_pairs([
            (FundingSource::ConvertibleDebt, 0.8),
            (FundingSource::CommonStock, 0.2),
        ])
        .expect("early-period weights sum to 1.0");

        let middle = AllocationWeights::from_pairs([
            (FundingSource::CommonStock, 0.7),
            (FundingSource::ConvertibleDebt, 0.3),
        ])
        .expect("middle-period weights sum to 1.0");

        let preferred_era = AllocationWeights::from_pairs([
            (FundingSource::CommonStock, 0.5),
            (FundingSource::Strc, 0.1),
            (FundingSource::Strk, 0.1),
            (FundingSource::Strd, 0.1),
            (FundingSource::Strf, 0.1),
            (FundingSource::Stre, 0.1),
        ])
        .expect("preferred-era weights sum to 1.0");

        Self {
            buckets: vec![
                PeriodBucket::new(None, Some(2022), early),
                PeriodBucket::new(Some(2023), Some(2024), middle),
                PeriodBucket::new(Some(2025), None, preferred_era),
            ],
        }
    }
}

/// Enrich an ordered purchase ledger with per-source allocations and
/// running cumulative totals.
///
/// # Errors
///
/// Returns [`LedgerError`] when the ledger is not date-ascending, the
/// reported cumulative column decreases, or a record's year falls outside
/// every schedule bucket. Violations are surfaced, never repaired.
pub fn attribute(
    records: &[PurchaseRecord],
    schedule: &AllocationSchedule,
) -> Result<Vec<LedgerEntry>, LedgerError> {
    for (index, pair) in records.windows(2).enumerate() {
        if pair[1].report_date < pair[0].report_date {
            return Err(LedgerError::OutOfOrder { index: index + 1 });
        }
        if pair[1].cumulative_btc < pair[0].cumulative_btc {
            return Err(LedgerError::NonMonotonicCumulative { index: index + 1 });
        }
    }

    let mut cumulative = SourceAmounts::zero();
    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        let year = record.report_date.year();
        let weights = schedule
            .weights_for_year(year)
            .ok_or(LedgerError::NoBucketForYear { year })?;

        let mut allocation = SourceAmounts::zero();
        for source in FundingSource::ALL {
            let amount = record.btc_acquired * weights.get(source);
            allocation.set(source, amount);
            cumulative.add(source, amount);
        }

        entries.push(LedgerEntry {
            report_date: record.report_date,
            btc_acquired: record.btc_acquired,
            cumulative_btc: record.cumulative_btc,
            allocation,
            cumulative_by_source: cumulative,
            projected: false,
        });
    }

    Ok(entries)
}
