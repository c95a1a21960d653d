//! PostgreSQL gateway over the synchronous `postgres` client.
//!
//! Statements go through the simple-query protocol, so every value arrives
//! already rendered as text and any statement type can be sent unprepared.
//! Each call runs inside a transaction:
//! - a statement that returns columns is never committed (the transaction
//!   rolls back when the connection is dropped),
//! - a statement without columns is committed and reports its row count.

use native_tls::TlsConnector;
use postgres::{Client, NoTls, SimpleQueryMessage};
use postgres_native_tls::MakeTlsConnector;
use tracing::{debug, warn};

use crate::error::QueryToolError;

use super::{ConnectionParams, Gateway, ResultSet, SslMode, StatementOutcome};

/// Gateway that opens a fresh PostgreSQL connection per statement.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresGateway;

impl PostgresGateway {
    pub fn new() -> Self {
        Self
    }
}

impl Gateway for PostgresGateway {
    fn execute(
        &self,
        params: &ConnectionParams,
        statement: &str,
    ) -> Result<StatementOutcome, QueryToolError> {
        let config = params.to_config()?;

        debug!(server = %params.describe(), sslmode = %params.ssl_mode, "connecting");
        let mut client = connect(&config, params.ssl_mode)?;

        let outcome = run_statement(&mut client, statement);
        match &outcome {
            Ok(StatementOutcome::Rows(rs)) => {
                debug!(
                    columns = rs.columns.len(),
                    rows = rs.row_count(),
                    "statement returned rows"
                );
            }
            Ok(StatementOutcome::Affected(n)) => {
                debug!(affected = n, "statement committed");
            }
            Err(e) => warn!(error = %e, "statement failed"),
        }

        // Connection closes here.
        drop(client);
        outcome
    }
}

fn connect(config: &postgres::Config, ssl_mode: SslMode) -> Result<Client, QueryToolError> {
    let result = match ssl_mode {
        SslMode::Disable => config.connect(NoTls),
        SslMode::Prefer | SslMode::Require => {
            // libpq `require` semantics: encrypt, but do not verify the certificate.
            let connector = TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()
                .map_err(|e| QueryToolError::Connection(format!("TLS setup failed: {}", e)))?;
            config.connect(MakeTlsConnector::new(connector))
        }
    };

    result.map_err(|e| {
        let msg = format_postgres_error(&e);
        warn!(error = %msg, "connection failed");
        QueryToolError::Connection(msg)
    })
}

fn run_statement(client: &mut Client, statement: &str) -> Result<StatementOutcome, QueryToolError> {
    let mut transaction = client.transaction().map_err(classify)?;
    let messages = transaction.simple_query(statement).map_err(classify)?;

    let outcome = fold_messages(messages.into_iter().filter_map(convert_message));

    match outcome {
        StatementOutcome::Rows(_) => {
            // No commit for row-returning statements; dropping rolls back.
            drop(transaction);
        }
        StatementOutcome::Affected(_) => transaction.commit().map_err(classify)?,
    }

    Ok(outcome)
}

/// Maps a driver error after connecting: a dead connection is a connection
/// error, everything else is an execution error.
fn classify(e: postgres::Error) -> QueryToolError {
    let msg = format_postgres_error(&e);
    if e.is_closed() {
        QueryToolError::Connection(msg)
    } else {
        QueryToolError::Execution(msg)
    }
}

/// Driver-independent view of simple-query protocol messages.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Message {
    Description(Vec<String>),
    Row {
        columns: Vec<String>,
        values: Vec<Option<String>>,
    },
    Complete(u64),
}

fn convert_message(msg: SimpleQueryMessage) -> Option<Message> {
    match msg {
        SimpleQueryMessage::RowDescription(columns) => Some(Message::Description(
            columns.iter().map(|c| c.name().to_string()).collect(),
        )),
        SimpleQueryMessage::Row(row) => Some(Message::Row {
            columns: row.columns().iter().map(|c| c.name().to_string()).collect(),
            values: (0..row.len())
                .map(|i| row.get(i).map(str::to_string))
                .collect(),
        }),
        SimpleQueryMessage::CommandComplete(n) => Some(Message::Complete(n)),
        _ => None,
    }
}

/// Reduces the message stream to the outcome of the final statement.
fn fold_messages<I>(messages: I) -> StatementOutcome
where
    I: IntoIterator<Item = Message>,
{
    let mut current: Option<ResultSet> = None;
    let mut last = StatementOutcome::Affected(0);

    for msg in messages {
        match msg {
            Message::Description(columns) => current = Some(ResultSet::new(columns)),
            Message::Row { columns, values } => {
                current
                    .get_or_insert_with(|| ResultSet::new(columns))
                    .push_row(values);
            }
            Message::Complete(n) => {
                last = match current.take() {
                    Some(rs) => StatementOutcome::Rows(rs),
                    None => StatementOutcome::Affected(n),
                };
            }
        }
    }

    match current {
        Some(rs) => StatementOutcome::Rows(rs),
        None => last,
    }
}

/// Formats PostgreSQL error message for display.
pub fn format_postgres_error(e: &postgres::Error) -> String {
    if let Some(db_error) = e.as_db_error() {
        format!("{}: {}", db_error.severity(), db_error.message())
    } else {
        let msg = e.to_string();
        if msg.contains("Connection refused") {
            "connection refused".to_string()
        } else if msg.contains("password authentication failed") {
            "password authentication failed".to_string()
        } else if msg.contains("does not exist") {
            msg.split("FATAL:")
                .last()
                .unwrap_or(&msg)
                .trim()
                .to_string()
        } else {
            msg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn select_with_rows() {
        let outcome = fold_messages(vec![
            Message::Description(strings(&["id", "model"])),
            Message::Row {
                columns: strings(&["id", "model"]),
                values: vec![Some("1".into()), Some("Boeing 777-300".into())],
            },
            Message::Row {
                columns: strings(&["id", "model"]),
                values: vec![Some("2".into()), None],
            },
            Message::Complete(2),
        ]);

        let StatementOutcome::Rows(rs) = outcome else {
            panic!("expected rows");
        };
        assert_eq!(rs.columns, strings(&["id", "model"]));
        assert_eq!(rs.rows[0], strings(&["1", "Boeing 777-300"]));
        assert_eq!(rs.rows[1], strings(&["2", "NULL"]));
    }

    #[test]
    fn select_without_rows_keeps_columns() {
        let outcome = fold_messages(vec![
            Message::Description(strings(&["aircraft_code", "range"])),
            Message::Complete(0),
        ]);
        assert_eq!(
            outcome,
            StatementOutcome::Rows(ResultSet::new(strings(&["aircraft_code", "range"])))
        );
    }

    #[test]
    fn update_reports_affected_rows() {
        let outcome = fold_messages(vec![Message::Complete(7)]);
        assert_eq!(outcome, StatementOutcome::Affected(7));
    }

    #[test]
    fn empty_query_is_zero_affected() {
        assert_eq!(fold_messages(Vec::new()), StatementOutcome::Affected(0));
    }

    #[test]
    fn final_statement_decides_outcome() {
        let outcome = fold_messages(vec![
            Message::Description(strings(&["x"])),
            Message::Row {
                columns: strings(&["x"]),
                values: vec![Some("1".into())],
            },
            Message::Complete(1),
            Message::Complete(3),
        ]);
        assert_eq!(outcome, StatementOutcome::Affected(3));

        let outcome = fold_messages(vec![
            Message::Complete(3),
            Message::Description(strings(&["y"])),
            Message::Complete(0),
        ]);
        assert_eq!(
            outcome,
            StatementOutcome::Rows(ResultSet::new(strings(&["y"])))
        );
    }

    #[test]
    fn rows_without_description_take_columns_from_row() {
        let outcome = fold_messages(vec![Message::Row {
            columns: strings(&["QUERY PLAN"]),
            values: vec![Some("Result  (cost=0.00..0.01 rows=1 width=4)".into())],
        }]);
        let StatementOutcome::Rows(rs) = outcome else {
            panic!("expected rows");
        };
        assert_eq!(rs.columns, strings(&["QUERY PLAN"]));
        assert_eq!(rs.row_count(), 1);
    }

    #[test]
    fn invalid_params_fail_before_connecting() {
        let params = ConnectionParams {
            host: String::new(),
            user: "app".to_string(),
            ..ConnectionParams::default()
        };
        let err = PostgresGateway::new()
            .execute(&params, "SELECT 1")
            .unwrap_err();
        assert!(matches!(err, QueryToolError::Validation(_)));
    }
}
