//! Provider-failure fallback values.
//!
//! Each provider endpoint has an explicit fallback policy: a constant for
//! holdings, a zeroed snapshot for quote failures, a bundled sample ledger
//! for history failures. Spot price has none; its absence is fatal for the
//! aggregate report. Values are injected configuration, not literals
//! scattered through the pipeline.

use crate::{PurchaseRecord, ReportDate};

/// Fallback values applied when providers signal unavailability.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackPolicy {
    /// Last known holdings figure, used when the holdings provider fails.
    pub holdings_btc: f64,
}

impl FallbackPolicy {
    /// Holdings as disclosed Jan 12, 2026.
    pub const DEFAULT_HOLDINGS_BTC: f64 = 687_410.0;

    /// Bundled purchase ledger served when the history provider fails.
    /// Date-ascending with a monotonic cumulative column ending at the
    /// fallback holdings figure.
    pub fn sample_ledger(&self) -> Vec<PurchaseRecord> {
        const ROWS: [(&str, f64, f64); 14] = [
            ("2020-08-11", 21_454.0, 21_454.0),
            ("2020-12-21", 49_016.0, 70_470.0),
            ("2021-02-24", 19_452.0, 89_922.0),
            ("2021-12-09", 34_227.0, 124_149.0),
            ("2022-06-28", 8_039.0, 132_188.0),
            ("2022-12-27", 8_813.0, 141_001.0),
            ("2023-06-27", 12_333.0, 153_334.0),
            ("2023-12-26", 36_220.0, 189_554.0),
            ("2024-03-19", 9_245.0, 198_799.0),
            ("2024-09-19", 54_296.0, 253_095.0),
            ("2024-12-30", 193_995.0, 447_090.0),
            ("2025-03-31", 80_785.0, 527_875.0),
            ("2025-06-30", 69_245.0, 597_120.0),
            ("2025-12-29", 90_290.0, 687_410.0),
        ];

        ROWS.into_iter()
            .map(|(date, acquired, cumulative)| {
                PurchaseRecord::new(
                    ReportDate::parse(date).expect("sample ledger dates are valid"),
                    acquired,
                    cumulative,
                )
                .expect("sample ledger rows are valid")
            })
            .collect()
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            holdings_btc: Self::DEFAULT_HOLDINGS_BTC,
        }
    }
}
