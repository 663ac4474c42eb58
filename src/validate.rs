// ✅ Record Validator & Filter
// One bad line never fails the whole refresh: rejected rows are dropped
// and recorded, surviving entities keep their input order.

use crate::config::ColumnConfig;
use crate::error::RowRejection;
use crate::normalize::{normalize_row, RawRow};
use crate::snapshot::Entity;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A dropped row and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    pub line: usize,
    pub reason: RowRejection,
}

/// Per-refresh filter statistics
#[derive(Debug, Clone, Default)]
pub struct FilterReport {
    pub accepted: usize,
    pub rejected: Vec<RejectedRow>,
}

impl FilterReport {
    pub fn total_rows(&self) -> usize {
        self.accepted + self.rejected.len()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// Every row was dropped, or there were no data rows at all
    pub fn is_empty_result(&self) -> bool {
        self.accepted == 0
    }

    pub fn summary(&self) -> FilterSummary {
        FilterSummary {
            total_rows: self.total_rows(),
            accepted: self.accepted,
            rejected: self.rejected_count(),
        }
    }
}

/// Serializable counts for API responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total_rows: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Apply the normalizer to every row, keeping only well-formed records
pub fn filter_valid<I>(rows: I, columns: &ColumnConfig) -> (Vec<Entity>, FilterReport)
where
    I: IntoIterator<Item = RawRow>,
{
    let mut entities = Vec::new();
    let mut report = FilterReport::default();

    for row in rows {
        match normalize_row(&row, columns) {
            Ok(entity) => {
                entities.push(entity);
                report.accepted += 1;
            }
            Err(reason) => {
                debug!(line = row.line, %reason, "dropping feed row");
                report.rejected.push(RejectedRow {
                    line: row.line,
                    reason,
                });
            }
        }
    }

    (entities, report)
}

/// Record a row the CSV reader could not decode
pub fn reject_malformed(report: &mut FilterReport, line: usize, detail: String) {
    let reason = RowRejection::Malformed(detail);
    debug!(line, %reason, "dropping feed row");
    report.rejected.push(RejectedRow { line, reason });
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> ColumnConfig {
        ColumnConfig::new("Name", "Gain", "Rank")
    }

    fn row(line: usize, name: &str, gain: &str, rank: &str) -> RawRow {
        RawRow::new(line)
            .with("Name", name)
            .with("Gain", gain)
            .with("Rank", rank)
    }

    #[test]
    fn test_filter_drops_malformed_keeps_order() {
        let rows = vec![
            row(2, "Alice", "12.5%", "1"),
            row(3, "", "bad", "x"),
            row(4, "Bob", "8,3%", "2"),
        ];

        let (entities, report) = filter_valid(rows, &columns());

        assert_eq!(
            entities,
            vec![Entity::new("Alice", 12.5, 1), Entity::new("Bob", 8.3, 2)]
        );
        assert_eq!(report.accepted, 2);
        assert_eq!(
            report.rejected,
            vec![RejectedRow {
                line: 3,
                reason: RowRejection::MissingName
            }]
        );
    }

    #[test]
    fn test_filter_safety_counts() {
        let mut rows = Vec::new();
        let mut well_formed = 0;
        for i in 0..30 {
            if i % 3 == 0 {
                rows.push(row(i + 2, "  ", "1%", "1"));
            } else if i % 5 == 0 {
                rows.push(row(i + 2, "Zed", "n/a", "4"));
            } else {
                rows.push(row(i + 2, &format!("P{}", i), "1,5%", &i.to_string()));
                well_formed += 1;
            }
        }

        let (entities, report) = filter_valid(rows, &columns());

        assert_eq!(entities.len(), well_formed);
        assert_eq!(report.total_rows(), 30);
        assert_eq!(report.rejected_count(), 30 - well_formed);
    }

    #[test]
    fn test_all_rejected_is_empty_result() {
        let rows = vec![row(2, "", "1%", "1"), row(3, "A", "x", "1")];
        let (entities, report) = filter_valid(rows, &columns());

        assert!(entities.is_empty());
        assert!(report.is_empty_result());
        assert_eq!(report.summary().rejected, 2);
    }

    #[test]
    fn test_no_rows_is_empty_result() {
        let (entities, report) = filter_valid(Vec::new(), &columns());
        assert!(entities.is_empty());
        assert!(report.is_empty_result());
        assert_eq!(report.total_rows(), 0);
    }

    #[test]
    fn test_reject_malformed() {
        let mut report = FilterReport::default();
        reject_malformed(&mut report, 7, "invalid UTF-8".to_string());

        assert_eq!(report.rejected_count(), 1);
        assert_eq!(report.rejected[0].line, 7);
        assert!(matches!(report.rejected[0].reason, RowRejection::Malformed(_)));
    }
}
