//! Key metrics scraped from textual EXPLAIN output.
//!
//! The extractor does not parse the plan tree. It looks for four fixed
//! markers and slices the text right after the first occurrence of each:
//!
//! | Marker          | Label                 | Value                                  |
//! |-----------------|-----------------------|----------------------------------------|
//! | `cost=`         | Total cost            | upper bound of `a..b`, two decimals    |
//! | `actual time=`  | Execution time (ms)   | upper bound of `a..b`, two decimals    |
//! | `rows=`         | Estimated row count   | first token, verbatim                  |
//! | `Buffers:`      | Buffer usage          | rest of the line, trimmed              |
//!
//! Only the first occurrence in the whole text counts, so for nested plans
//! the values come from the top node. Occurrences are never aggregated.

use serde::Serialize;

pub const TOTAL_COST: &str = "Total cost";
pub const EXECUTION_TIME: &str = "Execution time (ms)";
pub const ESTIMATED_ROWS: &str = "Estimated row count";
pub const BUFFER_USAGE: &str = "Buffer usage";

const COST_MARKER: &str = "cost=";
const ACTUAL_TIME_MARKER: &str = "actual time=";
const ROWS_MARKER: &str = "rows=";
const BUFFERS_MARKER: &str = "Buffers:";

/// Failure while scraping a metric whose marker was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanMetricError {
    /// The token after the marker is not a number.
    InvalidNumber { label: &'static str, raw: String },
    /// The marker is not followed by a `start..end` range.
    MissingRange { label: &'static str },
}

impl std::fmt::Display for PlanMetricError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanMetricError::InvalidNumber { label, raw } => {
                write!(f, "{}: could not convert '{}' to a number", label, raw)
            }
            PlanMetricError::MissingRange { label } => {
                write!(f, "{}: no '..' range after marker", label)
            }
        }
    }
}

impl std::error::Error for PlanMetricError {}

/// One scraped metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

/// Ordered set of scraped metrics.
///
/// Order is always cost, time, rows, buffers; absent markers are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MetricSet {
    entries: Vec<Metric>,
}

impl MetricSet {
    /// Value stored under `label`.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|m| m.label == label)
            .map(|m| m.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Metric> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, label: &'static str, value: String) {
        self.entries.push(Metric { label, value });
    }
}

/// Extracts the key metrics from raw plan text.
pub fn extract(plan_text: &str) -> Result<MetricSet, PlanMetricError> {
    let mut metrics = MetricSet::default();

    if let Some(rest) = after_marker(plan_text, COST_MARKER) {
        metrics.push(TOTAL_COST, range_upper_bound(rest, TOTAL_COST)?);
    }

    if let Some(rest) = after_marker(plan_text, ACTUAL_TIME_MARKER) {
        metrics.push(EXECUTION_TIME, range_upper_bound(rest, EXECUTION_TIME)?);
    }

    if let Some(rest) = after_marker(plan_text, ROWS_MARKER) {
        metrics.push(ESTIMATED_ROWS, first_token(rest).to_string());
    }

    if let Some(rest) = after_marker(plan_text, BUFFERS_MARKER) {
        let line = rest.split('\n').next().unwrap_or(rest);
        metrics.push(BUFFER_USAGE, line.trim().to_string());
    }

    Ok(metrics)
}

/// Text following the first occurrence of `marker`.
fn after_marker<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    text.find(marker).map(|idx| &text[idx + marker.len()..])
}

/// Text up to the first space (or everything when there is none).
fn first_token(text: &str) -> &str {
    text.find(' ').map_or(text, |idx| &text[..idx])
}

/// Upper bound of a `start..end` range, formatted with two decimals.
fn range_upper_bound(rest: &str, label: &'static str) -> Result<String, PlanMetricError> {
    let (_, upper) = rest
        .split_once("..")
        .ok_or(PlanMetricError::MissingRange { label })?;
    // Segment between the first and second `..`.
    let segment = upper.split("..").next().unwrap_or(upper);
    let token = first_token(segment);

    token
        .trim()
        .parse::<f64>()
        .map(|value| format!("{:.2}", value))
        .map_err(|_| PlanMetricError::InvalidNumber {
            label,
            raw: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEQ_SCAN: &str = "Seq Scan on aircrafts_data  (cost=0.00..12.34 rows=5 width=52)";

    const ANALYZE_PLAN: &str = "\
Hash Join  (cost=1.20..25.50 rows=120 width=16) (actual time=0.051..0.873 rows=118 loops=1)
  Hash Cond: (s.aircraft_code = a.aircraft_code)
  Buffers: shared hit=12 read=3
  ->  Seq Scan on seats s  (cost=0.00..21.39 rows=1339 width=8) (actual time=0.010..0.300 rows=1339 loops=1)
        Buffers: shared hit=9
  ->  Hash  (cost=1.09..1.09 rows=9 width=16) (actual time=0.020..0.021 rows=9 loops=1)
        Buffers: shared hit=1
Planning Time: 0.210 ms
Execution Time: 1.020 ms";

    #[test]
    fn cost_and_rows_from_single_node() {
        let metrics = extract(SEQ_SCAN).unwrap();
        assert_eq!(metrics.get(TOTAL_COST), Some("12.34"));
        assert_eq!(metrics.get(ESTIMATED_ROWS), Some("5"));
        assert_eq!(metrics.len(), 2);
    }

    #[test]
    fn no_execution_time_without_analyze() {
        let metrics = extract(SEQ_SCAN).unwrap();
        assert_eq!(metrics.get(EXECUTION_TIME), None);
        assert_eq!(metrics.get(BUFFER_USAGE), None);
    }

    #[test]
    fn nested_plan_uses_first_occurrence_only() {
        let metrics = extract(ANALYZE_PLAN).unwrap();
        assert_eq!(metrics.get(TOTAL_COST), Some("25.50"));
        assert_eq!(metrics.get(EXECUTION_TIME), Some("0.87"));
        assert_eq!(metrics.get(ESTIMATED_ROWS), Some("120"));
        assert_eq!(metrics.get(BUFFER_USAGE), Some("shared hit=12 read=3"));
    }

    #[test]
    fn metrics_keep_fixed_order() {
        let metrics = extract(ANALYZE_PLAN).unwrap();
        let labels: Vec<&str> = metrics.iter().map(|m| m.label).collect();
        assert_eq!(
            labels,
            vec![TOTAL_COST, EXECUTION_TIME, ESTIMATED_ROWS, BUFFER_USAGE]
        );
    }

    #[test]
    fn buffers_line_is_trimmed_and_stops_at_line_end() {
        let metrics = extract("Buffers: shared hit=12 read=3\nPlanning time: 0.1 ms").unwrap();
        assert_eq!(metrics.get(BUFFER_USAGE), Some("shared hit=12 read=3"));
        assert_eq!(metrics.len(), 1);
    }

    #[test]
    fn buffers_on_last_line() {
        let metrics = extract("Buffers:   shared read=7   ").unwrap();
        assert_eq!(metrics.get(BUFFER_USAGE), Some("shared read=7"));
    }

    #[test]
    fn plain_text_yields_empty_set() {
        let metrics = extract("Result\nPlanning Time: 0.020 ms").unwrap();
        assert!(metrics.is_empty());
        assert!(extract("").unwrap().is_empty());
    }

    #[test]
    fn cost_is_rounded_to_two_decimals() {
        let metrics = extract("Limit  (cost=0.00..0.015 rows=1 width=4)").unwrap();
        assert_eq!(metrics.get(TOTAL_COST), Some("0.01"));

        let metrics = extract("Sort  (cost=100.00..1234567.5 rows=10 width=4)").unwrap();
        assert_eq!(metrics.get(TOTAL_COST), Some("1234567.50"));
    }

    #[test]
    fn rows_value_is_verbatim() {
        let metrics = extract("Result  rows=1e3x").unwrap();
        assert_eq!(metrics.get(ESTIMATED_ROWS), Some("1e3x"));
    }

    #[test]
    fn non_numeric_cost_is_an_error() {
        let err = extract("Seq Scan  (cost=0.00..abc rows=5 width=4)").unwrap_err();
        assert_eq!(
            err,
            PlanMetricError::InvalidNumber {
                label: TOTAL_COST,
                raw: "abc".to_string(),
            }
        );
    }

    #[test]
    fn non_numeric_actual_time_is_an_error() {
        let err = extract("Seq Scan  (cost=0.00..1.00 rows=5) (actual time=0.1..never rows=1)")
            .unwrap_err();
        assert!(matches!(
            err,
            PlanMetricError::InvalidNumber {
                label: EXECUTION_TIME,
                ..
            }
        ));
    }

    #[test]
    fn cost_without_range_is_an_error() {
        let err = extract("cost=12 rows=1").unwrap_err();
        assert_eq!(err, PlanMetricError::MissingRange { label: TOTAL_COST });
    }

    #[test]
    fn upper_bound_stops_at_next_range() {
        // No space between the upper bound and the following range.
        let metrics = extract("cost=1.00..2.50..9 rows=1").unwrap();
        assert_eq!(metrics.get(TOTAL_COST), Some("2.50"));
    }

    #[test]
    fn serializes_as_ordered_list() {
        let metrics = extract(SEQ_SCAN).unwrap();
        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(
            json,
            r#"[{"label":"Total cost","value":"12.34"},{"label":"Estimated row count","value":"5"}]"#
        );
    }
}
