//! Per-source fetch reports and the aggregated search result.
//!
//! This module provides pure bookkeeping for what each source fetch produced,
//! decoupled from HTTP and from the entry points.

use std::fmt;

use crate::models::Item;

/// Upstream museum API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Harvard,
    Met,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Harvard => "Harvard",
            Source::Met => "MET",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a source fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The source had no more pages or identifiers.
    Exhausted,
    /// The result ceiling was reached.
    CeilingReached,
    /// The caller's deadline passed; items gathered so far were kept.
    DeadlineExpired,
    /// The source failed as a whole and contributes no items.
    Failed,
}

/// What one source fetch produced.
#[derive(Debug, Clone)]
pub struct SourceReport {
    pub source: Source,
    pub items: Vec<Item>,
    pub outcome: FetchOutcome,
    /// Records or identifiers dropped by normalization or per-item failures.
    pub skipped: usize,
    /// Failure message when `outcome` is `Failed`.
    pub error: Option<String>,
}

impl SourceReport {
    /// Creates a report for a fetch that ended without a source-level failure.
    pub fn completed(source: Source, items: Vec<Item>, outcome: FetchOutcome, skipped: usize) -> Self {
        Self {
            source,
            items,
            outcome,
            skipped,
            error: None,
        }
    }

    /// Creates a report for a failed source. Failed sources never carry items.
    pub fn failed(source: Source, error: String) -> Self {
        Self {
            source,
            items: Vec::new(),
            outcome: FetchOutcome::Failed,
            skipped: 0,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Counters kept for a source after its items were moved into the combined list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSummary {
    pub source: Source,
    pub count: usize,
    pub skipped: usize,
    pub outcome: FetchOutcome,
    pub error: Option<String>,
}

impl From<&SourceReport> for SourceSummary {
    fn from(report: &SourceReport) -> Self {
        Self {
            source: report.source,
            count: report.items.len(),
            skipped: report.skipped,
            outcome: report.outcome,
            error: report.error.clone(),
        }
    }
}

/// Combined result of an aggregated search: Harvard items first, then MET.
#[derive(Debug, Clone)]
pub struct AggregateResult {
    pub items: Vec<Item>,
    pub harvard: SourceSummary,
    pub met: SourceSummary,
}

impl AggregateResult {
    /// Concatenates both reports, preserving each source's order.
    pub fn combine(harvard: SourceReport, met: SourceReport) -> Self {
        let harvard_summary = SourceSummary::from(&harvard);
        let met_summary = SourceSummary::from(&met);

        let mut items = harvard.items;
        items.extend(met.items);

        Self {
            items,
            harvard: harvard_summary,
            met: met_summary,
        }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64) -> Item {
        Item {
            credit_line: None,
            article_division: None,
            article_id: id,
            article_classification: None,
            image_url: None,
            artist_name: None,
            technique: None,
            title: None,
            date: None,
            item_url: None,
            century: "Unknown Century".to_string(),
            artist_nationality: None,
        }
    }

    #[test]
    fn test_failed_report_has_no_items() {
        let report = SourceReport::failed(Source::Harvard, "HTTP 500".to_string());
        assert!(!report.is_success());
        assert!(report.is_empty());
        assert_eq!(report.outcome, FetchOutcome::Failed);
    }

    #[test]
    fn test_combine_orders_harvard_first() {
        let harvard = SourceReport::completed(
            Source::Harvard,
            vec![item(1), item(2)],
            FetchOutcome::Exhausted,
            0,
        );
        let met = SourceReport::completed(
            Source::Met,
            vec![item(10), item(11), item(12)],
            FetchOutcome::CeilingReached,
            2,
        );

        let result = AggregateResult::combine(harvard, met);
        let ids: Vec<i64> = result.items.iter().map(|i| i.article_id).collect();

        assert_eq!(ids, vec![1, 2, 10, 11, 12]);
        assert_eq!(result.total(), 5);
        assert_eq!(result.harvard.count, 2);
        assert_eq!(result.met.count, 3);
        assert_eq!(result.met.skipped, 2);
    }

    #[test]
    fn test_combine_with_failed_source() {
        let harvard = SourceReport::failed(Source::Harvard, "unreachable".to_string());
        let met = SourceReport::completed(Source::Met, vec![item(7)], FetchOutcome::Exhausted, 0);

        let result = AggregateResult::combine(harvard, met);
        assert_eq!(result.items, vec![item(7)]);
        assert_eq!(result.harvard.error.as_deref(), Some("unreachable"));
    }

    #[test]
    fn test_source_display() {
        assert_eq!(Source::Harvard.to_string(), "Harvard");
        assert_eq!(Source::Met.to_string(), "MET");
    }
}
