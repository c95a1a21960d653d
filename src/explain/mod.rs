//! EXPLAIN statement construction and plan text handling.

pub mod metrics;

use serde::Serialize;

pub use metrics::{Metric, MetricSet, PlanMetricError, extract};

/// EXPLAIN options selectable by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExplainOptions {
    /// Actually run the statement and report real timings.
    pub analyze: bool,
    pub verbose: bool,
    pub buffers: bool,
}

impl ExplainOptions {
    /// Selected option keywords, always in ANALYZE, VERBOSE, BUFFERS order.
    pub fn keywords(&self) -> Vec<&'static str> {
        [
            (self.analyze, "ANALYZE"),
            (self.verbose, "VERBOSE"),
            (self.buffers, "BUFFERS"),
        ]
        .into_iter()
        .filter_map(|(selected, keyword)| selected.then_some(keyword))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        !(self.analyze || self.verbose || self.buffers)
    }

    /// Wraps `sql` in an EXPLAIN statement.
    ///
    /// PostgreSQL rejects an empty parenthesized option list, so no
    /// selected options yields a bare `EXPLAIN <sql>`.
    pub fn statement(&self, sql: &str) -> String {
        if self.is_empty() {
            format!("EXPLAIN {}", sql)
        } else {
            format!("EXPLAIN ({}) {}", self.keywords().join(", "), sql)
        }
    }
}

/// Textual plan as returned by the server, one entry per output row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PlanText {
    lines: Vec<String>,
}

impl PlanText {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Plan lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQL: &str = "SELECT * FROM aircrafts_data";

    #[test]
    fn analyze_and_buffers_without_verbose() {
        let options = ExplainOptions {
            analyze: true,
            verbose: false,
            buffers: true,
        };
        assert_eq!(
            options.statement(SQL),
            "EXPLAIN (ANALYZE, BUFFERS) SELECT * FROM aircrafts_data"
        );
    }

    #[test]
    fn all_options_in_fixed_order() {
        let options = ExplainOptions {
            analyze: true,
            verbose: true,
            buffers: true,
        };
        assert_eq!(options.keywords(), vec!["ANALYZE", "VERBOSE", "BUFFERS"]);
        assert_eq!(
            options.statement("SELECT 1"),
            "EXPLAIN (ANALYZE, VERBOSE, BUFFERS) SELECT 1"
        );
    }

    #[test]
    fn single_option() {
        let options = ExplainOptions {
            verbose: true,
            ..ExplainOptions::default()
        };
        assert_eq!(options.statement("SELECT 1"), "EXPLAIN (VERBOSE) SELECT 1");
    }

    #[test]
    fn no_options_yields_bare_explain() {
        let options = ExplainOptions::default();
        assert!(options.is_empty());
        assert_eq!(options.statement("SELECT 1"), "EXPLAIN SELECT 1");
    }

    #[test]
    fn plan_text_joins_lines() {
        let plan = PlanText::new(vec![
            "Seq Scan on t  (cost=0.00..1.00 rows=1 width=4)".to_string(),
            "  Filter: (id = 1)".to_string(),
        ]);
        assert_eq!(
            plan.text(),
            "Seq Scan on t  (cost=0.00..1.00 rows=1 width=4)\n  Filter: (id = 1)"
        );
        assert!(PlanText::default().is_empty());
        assert!(PlanText::default().text().is_empty());
    }
}
