use btcnav_core::attribution::{attribute, AllocationSchedule, PeriodBucket};
use btcnav_core::{
    AllocationWeights, FallbackPolicy, FundingSource, LedgerError, PurchaseRecord, ReportDate,
};

fn record(date: &str, acquired: f64, cumulative: f64) -> PurchaseRecord {
    PurchaseRecord::new(
        ReportDate::parse(date).expect("valid date"),
        acquired,
        cumulative,
    )
    .expect("valid record")
}

#[test]
fn sample_ledger_attributes_cleanly_under_default_schedule() {
    let history = FallbackPolicy::default().sample_ledger();
    let entries = attribute(&history, &AllocationSchedule::default()).expect("sample attributes");

    assert_eq!(entries.len(), history.len());
    let last = entries.last().expect("non-empty");
    assert_eq!(last.cumulative_btc, 687_410.0);

    // Every acquired coin lands in exactly one funding source.
    let acquired_total: f64 = history.iter().map(|r| r.btc_acquired).sum();
    assert!((last.cumulative_by_source.total() - acquired_total).abs() < 1e-6);
}

#[test]
fn per_source_series_never_decreases() {
    let history = FallbackPolicy::default().sample_ledger();
    let entries = attribute(&history, &AllocationSchedule::default()).expect("sample attributes");

    for pair in entries.windows(2) {
        for source in FundingSource::ALL {
            assert!(
                pair[1].cumulative_by_source.get(source)
                    >= pair[0].cumulative_by_source.get(source)
            );
        }
    }
}

#[test]
fn preferred_classes_only_appear_from_2025() {
    let history = FallbackPolicy::default().sample_ledger();
    let entries = attribute(&history, &AllocationSchedule::default()).expect("sample attributes");

    for entry in &entries {
        let has_preferred = entry.allocation.get(FundingSource::Strc) > 0.0;
        if entry.report_date.year() < 2025 {
            assert!(!has_preferred, "preferred allocation before 2025");
        }
    }
    assert!(entries
        .iter()
        .any(|entry| entry.allocation.get(FundingSource::Strk) > 0.0));
}

#[test]
fn equal_dates_are_accepted_in_order() {
    let entries = attribute(
        &[
            record("2024-03-19", 500.0, 500.0),
            record("2024-03-19", 250.0, 750.0),
        ],
        &AllocationSchedule::default(),
    )
    .expect("equal report dates are a valid ledger");

    assert_eq!(entries[1].cumulative_btc, 750.0);
}

#[test]
fn out_of_order_ledger_is_surfaced_not_repaired() {
    let err = attribute(
        &[
            record("2024-09-19", 500.0, 500.0),
            record("2024-03-19", 250.0, 750.0),
        ],
        &AllocationSchedule::default(),
    )
    .expect_err("must fail");

    assert_eq!(err, LedgerError::OutOfOrder { index: 1 });
}

#[test]
fn decreasing_cumulative_column_names_the_offending_row() {
    let err = attribute(
        &[
            record("2024-03-19", 500.0, 500.0),
            record("2024-06-19", 250.0, 750.0),
            record("2024-09-19", 100.0, 700.0),
        ],
        &AllocationSchedule::default(),
    )
    .expect_err("must fail");

    assert_eq!(err, LedgerError::NonMonotonicCumulative { index: 2 });
}

#[test]
fn first_matching_bucket_wins_on_overlap() {
    let all_common =
        AllocationWeights::from_pairs([(FundingSource::CommonStock, 1.0)]).expect("valid weights");
    let all_debt = AllocationWeights::from_pairs([(FundingSource::ConvertibleDebt, 1.0)])
        .expect("valid weights");

    let schedule = AllocationSchedule::new(vec![
        PeriodBucket::new(Some(2024), Some(2024), all_common),
        PeriodBucket::new(None, None, all_debt),
    ])
    .expect("valid schedule");

    let entries =
        attribute(&[record("2024-03-19", 100.0, 100.0)], &schedule).expect("valid ledger");
    assert_eq!(entries[0].allocation.get(FundingSource::CommonStock), 100.0);
}
