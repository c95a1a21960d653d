//! Session core: the two user actions and the results they leave behind.
//!
//! The shell owns a [`Session`] and feeds it requests; everything it renders
//! in the Results tab comes from [`Session::results`]. Failures never touch
//! the stored results.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::QueryToolError;
use crate::explain::{ExplainOptions, MetricSet, PlanText, extract};
use crate::gateway::{ConnectionParams, Gateway, ResultSet, StatementOutcome};

/// SQL text plus the EXPLAIN options selected at the time of the action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    pub sql_text: String,
    pub options: ExplainOptions,
}

impl QueryRequest {
    pub fn new(sql_text: impl Into<String>, options: ExplainOptions) -> Self {
        Self {
            sql_text: sql_text.into(),
            options,
        }
    }

    /// Trimmed SQL; empty input is a validation error.
    pub fn sql(&self) -> Result<&str, QueryToolError> {
        let sql = self.sql_text.trim();
        if sql.is_empty() {
            Err(QueryToolError::Validation(
                "Please enter a SQL statement".to_string(),
            ))
        } else {
            Ok(sql)
        }
    }
}

/// User action that produced a result or an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Explain,
    Execute,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Explain => "EXPLAIN",
            Action::Execute => "Execute",
        }
    }

    /// Dialog title for a generic failure of this action.
    pub fn failure_title(&self) -> &'static str {
        match self {
            Action::Explain => "Plan analysis error",
            Action::Execute => "Query execution error",
        }
    }
}

/// Result of an EXPLAIN action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainReport {
    pub statement: String,
    pub plan: PlanText,
    pub metrics: MetricSet,
}

/// What the Results tab shows. Plan/metrics and rows are never populated
/// together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultsView {
    #[default]
    Empty,
    Rows(ResultSet),
    Affected(u64),
    Plan { plan: PlanText, metrics: MetricSet },
}

impl ResultsView {
    pub fn result_set(&self) -> Option<&ResultSet> {
        match self {
            ResultsView::Rows(rs) => Some(rs),
            _ => None,
        }
    }

    pub fn metrics(&self) -> Option<&MetricSet> {
        match self {
            ResultsView::Plan { metrics, .. } => Some(metrics),
            _ => None,
        }
    }

    pub fn plan(&self) -> Option<&PlanText> {
        match self {
            ResultsView::Plan { plan, .. } => Some(plan),
            _ => None,
        }
    }
}

/// Timing of the last successful action.
#[derive(Debug, Clone, PartialEq)]
pub struct RunInfo {
    pub action: Action,
    pub finished_at: DateTime<Local>,
    pub elapsed: Duration,
}

/// Runs an EXPLAIN for `request` and scrapes the plan metrics.
///
/// Empty SQL fails before `gateway` is called.
pub fn run_explain<G: Gateway + ?Sized>(
    gateway: &G,
    params: &ConnectionParams,
    request: &QueryRequest,
) -> Result<ExplainReport, QueryToolError> {
    let sql = request.sql()?;
    let statement = request.options.statement(sql);
    debug!(statement = %statement, "running EXPLAIN");

    let rs = match gateway.execute(params, &statement)? {
        StatementOutcome::Rows(rs) => rs,
        StatementOutcome::Affected(_) => {
            return Err(QueryToolError::Execution(
                "EXPLAIN produced no plan".to_string(),
            ));
        }
    };

    // Plan lines live in the first column.
    let plan = PlanText::new(
        rs.rows
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect(),
    );
    let metrics = extract(&plan.text())?;

    Ok(ExplainReport {
        statement,
        plan,
        metrics,
    })
}

/// Runs `request` as-is.
///
/// Empty SQL fails before `gateway` is called.
pub fn run_statement<G: Gateway + ?Sized>(
    gateway: &G,
    params: &ConnectionParams,
    request: &QueryRequest,
) -> Result<StatementOutcome, QueryToolError> {
    let sql = request.sql()?;
    gateway.execute(params, sql)
}

/// Results and timing of the last successful action.
#[derive(Debug, Default)]
pub struct Session {
    pub results: ResultsView,
    pub last_run: Option<RunInfo>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// EXPLAIN action; on success replaces the results with plan + metrics.
    pub fn explain<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        params: &ConnectionParams,
        request: &QueryRequest,
    ) -> Result<(), QueryToolError> {
        let started = Instant::now();
        let report = run_explain(gateway, params, request)?;
        info!(
            lines = report.plan.lines().len(),
            metrics = report.metrics.len(),
            "plan analysed"
        );
        self.results = ResultsView::Plan {
            plan: report.plan,
            metrics: report.metrics,
        };
        self.finish(Action::Explain, started);
        Ok(())
    }

    /// Execute action; on success replaces the results with rows or a count.
    pub fn execute<G: Gateway + ?Sized>(
        &mut self,
        gateway: &G,
        params: &ConnectionParams,
        request: &QueryRequest,
    ) -> Result<(), QueryToolError> {
        let started = Instant::now();
        self.results = match run_statement(gateway, params, request)? {
            StatementOutcome::Rows(rs) => {
                info!(rows = rs.row_count(), "query returned rows");
                ResultsView::Rows(rs)
            }
            StatementOutcome::Affected(n) => {
                info!(affected = n, "statement executed");
                ResultsView::Affected(n)
            }
        };
        self.finish(Action::Execute, started);
        Ok(())
    }

    /// Runs `action` for `request`.
    pub fn run<G: Gateway + ?Sized>(
        &mut self,
        action: Action,
        gateway: &G,
        params: &ConnectionParams,
        request: &QueryRequest,
    ) -> Result<(), QueryToolError> {
        match action {
            Action::Explain => self.explain(gateway, params, request),
            Action::Execute => self.execute(gateway, params, request),
        }
    }

    pub fn clear(&mut self) {
        self.results = ResultsView::Empty;
        self.last_run = None;
    }

    fn finish(&mut self, action: Action, started: Instant) {
        self.last_run = Some(RunInfo {
            action,
            finished_at: Local::now(),
            elapsed: started.elapsed(),
        });
    }
}
