//! Plain-text and JSON rendering for batch mode.

use serde_json::{Value, json};

use crate::explain::MetricSet;
use crate::gateway::{ResultSet, StatementOutcome};
use crate::session::ExplainReport;

/// Output format for batch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Renders a statement outcome.
pub fn render_outcome(outcome: &StatementOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => match outcome {
            StatementOutcome::Rows(rs) => format_result_set(rs),
            StatementOutcome::Affected(n) => format_affected(*n),
        },
        OutputFormat::Json => to_json_string(&outcome_json(outcome)),
    }
}

/// Renders an EXPLAIN report.
pub fn render_report(report: &ExplainReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = report.plan.text();
            out.push_str("\n\n");
            out.push_str(&format_metrics(&report.metrics));
            out
        }
        OutputFormat::Json => to_json_string(&json!(report)),
    }
}

pub fn outcome_json(outcome: &StatementOutcome) -> Value {
    match outcome {
        StatementOutcome::Rows(rs) => json!(rs),
        StatementOutcome::Affected(n) => json!({ "affected_rows": n }),
    }
}

pub fn format_affected(count: u64) -> String {
    format!("Statement executed successfully. Rows affected: {}", count)
}

/// Aligned table with a row-count footer.
pub fn format_result_set(rs: &ResultSet) -> String {
    let mut out = format_table(&rs.columns, &rs.rows);
    let n = rs.row_count();
    out.push_str(&format!("({} {})", n, if n == 1 { "row" } else { "rows" }));
    out
}

/// Two-column Metric/Value table.
pub fn format_metrics(metrics: &MetricSet) -> String {
    if metrics.is_empty() {
        return "(no metrics found in plan)".to_string();
    }
    let headers = vec!["Metric".to_string(), "Value".to_string()];
    let rows: Vec<Vec<String>> = metrics
        .iter()
        .map(|m| vec![m.label.to_string(), m.value.clone()])
        .collect();
    let mut out = format_table(&headers, &rows);
    // Drop trailing newline.
    out.pop();
    out
}

fn format_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let cell = cells.get(i).map(String::as_str).unwrap_or("");
                format!(" {:<width$} ", cell, width = *w)
            })
            .collect();
        padded.join("|").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers));
    out.push('\n');
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    out.push_str(&separator.join("+"));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

fn to_json_string(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
