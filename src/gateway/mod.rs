//! Database gateway: one connection, one statement, one outcome.
//!
//! [`Gateway`] is the seam between the session core and the server.
//! [`PostgresGateway`] talks to a real server; [`mock::MockGateway`] replays
//! scripted outcomes for tests.

pub mod mock;
mod params;
mod pg;

use serde::Serialize;

use crate::error::QueryToolError;

pub use pg::{PostgresGateway, format_postgres_error};
pub use params::{ConnectionParams, DEFAULT_PORT, SslMode};

/// Display marker for SQL NULL.
pub const NULL_MARKER: &str = "NULL";

/// Column names plus rows of display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows;
        self
    }

    /// Appends a row, rendering absent values as [`NULL_MARKER`].
    pub fn push_row<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Option<String>>,
    {
        self.rows.push(
            values
                .into_iter()
                .map(|v| v.unwrap_or_else(|| NULL_MARKER.to_string()))
                .collect(),
        );
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// What a statement produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    /// The statement described columns; rows may be empty.
    Rows(ResultSet),
    /// No columns; number of rows the command touched.
    Affected(u64),
}

/// Executes a single statement against a database.
pub trait Gateway {
    /// Opens a connection, runs `statement` and closes the connection.
    fn execute(
        &self,
        params: &ConnectionParams,
        statement: &str,
    ) -> Result<StatementOutcome, QueryToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_row_renders_null_marker() {
        let mut rs = ResultSet::new(vec!["id".to_string(), "name".to_string()]);
        rs.push_row([Some("1".to_string()), None]);
        assert_eq!(rs.rows, vec![vec!["1".to_string(), "NULL".to_string()]]);
        assert_eq!(rs.row_count(), 1);
    }
}
