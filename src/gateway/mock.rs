//! Scripted gateway for tests and demos.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::QueryToolError;

use super::{ConnectionParams, Gateway, ResultSet, StatementOutcome};

/// Gateway that replays queued outcomes and records every statement it
/// receives.
#[derive(Debug, Default)]
pub struct MockGateway {
    responses: RefCell<VecDeque<Result<StatementOutcome, QueryToolError>>>,
    statements: RefCell<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an arbitrary outcome.
    pub fn respond(self, response: Result<StatementOutcome, QueryToolError>) -> Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    /// Queues a result set.
    pub fn respond_rows(self, columns: &[&str], rows: &[&[&str]]) -> Self {
        let rs = ResultSet::new(columns.iter().map(|c| c.to_string()).collect()).with_rows(
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        );
        self.respond(Ok(StatementOutcome::Rows(rs)))
    }

    /// Queues a plan as a single `QUERY PLAN` column, one row per line.
    pub fn respond_plan(self, plan: &str) -> Self {
        let rows: Vec<Vec<String>> = plan.lines().map(|l| vec![l.to_string()]).collect();
        let rs = ResultSet::new(vec!["QUERY PLAN".to_string()]).with_rows(rows);
        self.respond(Ok(StatementOutcome::Rows(rs)))
    }

    /// Queues an affected-row count.
    pub fn respond_affected(self, count: u64) -> Self {
        self.respond(Ok(StatementOutcome::Affected(count)))
    }

    /// Queues an error.
    pub fn respond_error(self, error: QueryToolError) -> Self {
        self.respond(Err(error))
    }

    /// Statements received so far, in order.
    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.statements.borrow().len()
    }
}

impl Gateway for MockGateway {
    fn execute(
        &self,
        _params: &ConnectionParams,
        statement: &str,
    ) -> Result<StatementOutcome, QueryToolError> {
        self.statements.borrow_mut().push(statement.to_string());
        self.responses.borrow_mut().pop_front().unwrap_or_else(|| {
            Err(QueryToolError::Execution(
                "no scripted response left".to_string(),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_records_statements() {
        let gateway = MockGateway::new()
            .respond_affected(3)
            .respond_rows(&["n"], &[&["1"]]);
        let params = ConnectionParams::default();

        assert_eq!(
            gateway.execute(&params, "UPDATE t SET x = 1").unwrap(),
            StatementOutcome::Affected(3)
        );
        let StatementOutcome::Rows(rs) = gateway.execute(&params, "SELECT 1 AS n").unwrap() else {
            panic!("expected rows");
        };
        assert_eq!(rs.rows, vec![vec!["1".to_string()]]);
        assert!(gateway.execute(&params, "SELECT 2").is_err());
        assert_eq!(
            gateway.statements(),
            vec!["UPDATE t SET x = 1", "SELECT 1 AS n", "SELECT 2"]
        );
    }
}
