//! Error types shared by the gateway, the session core and the shell.

use crate::explain::metrics::PlanMetricError;

/// Error kinds surfaced to the user.
///
/// Every failed action ends in exactly one of these. The shell picks the
/// dialog title from the variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToolError {
    /// Could not reach or authenticate against the server.
    Connection(String),
    /// The server (or plan scraping) rejected the statement.
    Execution(String),
    /// Input was rejected before contacting the server.
    Validation(String),
}

impl QueryToolError {
    /// Short label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryToolError::Connection(_) => "Connection error",
            QueryToolError::Execution(_) => "Execution error",
            QueryToolError::Validation(_) => "Validation error",
        }
    }

    /// Message without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            QueryToolError::Connection(msg)
            | QueryToolError::Execution(msg)
            | QueryToolError::Validation(msg) => msg,
        }
    }
}

impl std::fmt::Display for QueryToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryToolError::Connection(msg) => write!(f, "connection failed: {}", msg),
            QueryToolError::Execution(msg) => write!(f, "execution failed: {}", msg),
            QueryToolError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for QueryToolError {}

impl From<PlanMetricError> for QueryToolError {
    fn from(e: PlanMetricError) -> Self {
        QueryToolError::Execution(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_metric_error_becomes_execution_error() {
        let err: QueryToolError = PlanMetricError::InvalidNumber {
            label: "Total cost",
            raw: "abc".to_string(),
        }
        .into();
        assert!(matches!(err, QueryToolError::Execution(_)));
        assert!(err.message().contains("Total cost"));
    }

    #[test]
    fn display_prefixes_by_kind() {
        assert_eq!(
            QueryToolError::Connection("connection refused".into()).to_string(),
            "connection failed: connection refused"
        );
        assert_eq!(
            QueryToolError::Validation("SQL text is empty".into()).to_string(),
            "SQL text is empty"
        );
        assert_eq!(QueryToolError::Execution(String::new()).kind(), "Execution error");
    }
}
