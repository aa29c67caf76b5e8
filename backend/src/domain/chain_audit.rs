//! Opening -> closing chain verification across stored days.
//!
//! A day's opening balance must equal the previous calendar day's closing
//! balance when that day is on record, and zero otherwise. Each record must
//! also satisfy its own arithmetic identities.

use std::collections::HashMap;

use chrono::NaiveDate;
use shared::{recompute, ChainAuditResponse, ChainDiscrepancy, ChainDiscrepancyKind, DailySummary, BALANCE_EPSILON};
use tracing::warn;

fn differs(expected: f64, actual: f64) -> bool {
    (expected - actual).abs() > BALANCE_EPSILON
}

/// Check every record dated on or after `first_checked` (all records when `None`).
///
/// Records before `first_checked` only serve as predecessors.
pub fn audit_chain(records: &[DailySummary], first_checked: Option<NaiveDate>) -> ChainAuditResponse {
    let by_date: HashMap<NaiveDate, &DailySummary> = records.iter().map(|r| (r.date, r)).collect();

    let mut checked: Vec<&DailySummary> = records
        .iter()
        .filter(|r| first_checked.map_or(true, |first| r.date >= first))
        .collect();
    checked.sort_by_key(|r| r.date);

    let mut discrepancies = Vec::new();

    for record in &checked {
        let previous = record.date.pred_opt().and_then(|d| by_date.get(&d));
        match previous {
            Some(prev) => {
                if differs(prev.closing_balance, record.opening_balance) {
                    discrepancies.push(ChainDiscrepancy {
                        date: record.date,
                        kind: ChainDiscrepancyKind::OpeningMismatch,
                        expected: prev.closing_balance,
                        actual: record.opening_balance,
                    });
                }
            }
            None => {
                if differs(0.0, record.opening_balance) {
                    discrepancies.push(ChainDiscrepancy {
                        date: record.date,
                        kind: ChainDiscrepancyKind::UnexpectedOpening,
                        expected: 0.0,
                        actual: record.opening_balance,
                    });
                }
            }
        }

        let expected = recompute(record.opening_balance, record.daily_income, record.daily_expenses);
        if differs(expected.total_balance, record.total_balance) {
            discrepancies.push(ChainDiscrepancy {
                date: record.date,
                kind: ChainDiscrepancyKind::TotalMismatch,
                expected: expected.total_balance,
                actual: record.total_balance,
            });
        }
        // Closing is checked against the stored total, not the recomputed one
        let expected_closing = record.total_balance - record.daily_expenses;
        if differs(expected_closing, record.closing_balance) {
            discrepancies.push(ChainDiscrepancy {
                date: record.date,
                kind: ChainDiscrepancyKind::ClosingMismatch,
                expected: expected_closing,
                actual: record.closing_balance,
            });
        }
    }

    for d in &discrepancies {
        warn!(
            "Chain discrepancy on {}: {:?} expected {:.2}, actual {:.2}",
            d.date, d.kind, d.expected, d.actual
        );
    }

    ChainAuditResponse {
        records_checked: checked.len(),
        discrepancies,
    }
}
