//! Application state record passed to input handling and rendering.

use crate::error::QueryToolError;
use crate::explain::ExplainOptions;
use crate::gateway::{ConnectionParams, DEFAULT_PORT, SslMode};
use crate::session::{Action, QueryRequest, Session};

/// Available tabs in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Query,
    Results,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Query, Tab::Results]
    }

    /// Returns the display name of the tab.
    pub fn name(&self) -> &'static str {
        match self {
            Tab::Query => "Query",
            Tab::Results => "Results",
        }
    }
}

/// Focusable element on the Query tab, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Field {
    #[default]
    Host,
    Port,
    Database,
    User,
    Password,
    Sql,
    Analyze,
    Verbose,
    Buffers,
    AnalyzeButton,
    ExecuteButton,
    ClearButton,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::Host,
        Field::Port,
        Field::Database,
        Field::User,
        Field::Password,
        Field::Sql,
        Field::Analyze,
        Field::Verbose,
        Field::Buffers,
        Field::AnalyzeButton,
        Field::ExecuteButton,
        Field::ClearButton,
    ];

    fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Field {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Field {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Host => "Host",
            Field::Port => "Port",
            Field::Database => "Database",
            Field::User => "User",
            Field::Password => "Password",
            Field::Sql => "SQL",
            Field::Analyze => "ANALYZE (run the query)",
            Field::Verbose => "VERBOSE",
            Field::Buffers => "BUFFERS",
            Field::AnalyzeButton => "Analyze plan (EXPLAIN)",
            Field::ExecuteButton => "Execute query",
            Field::ClearButton => "Clear",
        }
    }

    /// Accepts typed characters.
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            Field::Host | Field::Port | Field::Database | Field::User | Field::Password | Field::Sql
        )
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self, Field::Analyze | Field::Verbose | Field::Buffers)
    }
}

/// Connection form, SQL text and EXPLAIN option toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryForm {
    pub host: String,
    pub port: String,
    pub database: String,
    pub user: String,
    pub password: String,
    pub sql: String,
    pub options: ExplainOptions,
}

impl Default for QueryForm {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT.to_string(),
            database: String::new(),
            user: String::new(),
            password: String::new(),
            sql: String::new(),
            options: ExplainOptions::default(),
        }
    }
}

impl QueryForm {
    /// Form prefilled from connection parameters.
    pub fn from_params(params: &ConnectionParams) -> Self {
        Self {
            host: params.host.clone(),
            port: params.port.clone(),
            database: params.database.clone(),
            user: params.user.clone(),
            password: params.password.clone(),
            ..Self::default()
        }
    }

    /// Text buffer behind a text field.
    pub fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Host => Some(&mut self.host),
            Field::Port => Some(&mut self.port),
            Field::Database => Some(&mut self.database),
            Field::User => Some(&mut self.user),
            Field::Password => Some(&mut self.password),
            Field::Sql => Some(&mut self.sql),
            _ => None,
        }
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Host => Some(&self.host),
            Field::Port => Some(&self.port),
            Field::Database => Some(&self.database),
            Field::User => Some(&self.user),
            Field::Password => Some(&self.password),
            Field::Sql => Some(&self.sql),
            _ => None,
        }
    }

    pub fn option(&self, field: Field) -> Option<bool> {
        match field {
            Field::Analyze => Some(self.options.analyze),
            Field::Verbose => Some(self.options.verbose),
            Field::Buffers => Some(self.options.buffers),
            _ => None,
        }
    }

    pub fn toggle(&mut self, field: Field) {
        match field {
            Field::Analyze => self.options.analyze = !self.options.analyze,
            Field::Verbose => self.options.verbose = !self.options.verbose,
            Field::Buffers => self.options.buffers = !self.options.buffers,
            _ => {}
        }
    }

    /// Blanks every field, the port included.
    pub fn clear(&mut self) {
        self.host.clear();
        self.port.clear();
        self.database.clear();
        self.user.clear();
        self.password.clear();
        self.sql.clear();
        self.options = ExplainOptions::default();
    }

    pub fn params(&self, ssl_mode: SslMode) -> ConnectionParams {
        ConnectionParams {
            host: self.host.clone(),
            port: self.port.clone(),
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            ssl_mode,
        }
    }

    pub fn request(&self) -> QueryRequest {
        QueryRequest::new(self.sql.clone(), self.options)
    }
}

/// Active popup state. Only one popup can be open at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PopupState {
    /// No popup is open.
    #[default]
    None,
    /// Help popup with scroll offset.
    Help { scroll: usize },
    /// Quit confirmation dialog.
    QuitConfirm,
    /// Modal error report.
    Error { title: String, message: String },
}

impl PopupState {
    /// Returns true if any popup is open (excluding None).
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Error dialog for a failed action.
    pub fn error(action: Action, err: &QueryToolError) -> Self {
        let title = match err {
            QueryToolError::Connection(_) => "Connection error",
            QueryToolError::Validation(_) => "Invalid input",
            QueryToolError::Execution(_) => action.failure_title(),
        };
        Self::Error {
            title: title.to_string(),
            message: err.message().to_string(),
        }
    }
}

/// Main application state.
#[derive(Debug, Default)]
pub struct AppState {
    /// Current active tab.
    pub current_tab: Tab,
    /// Focused element on the Query tab.
    pub focus: Field,
    pub form: QueryForm,
    /// TLS mode used for connections (not editable in the form).
    pub ssl_mode: SslMode,
    /// Results of the last successful action.
    pub session: Session,
    pub popup: PopupState,
    /// Vertical scroll in the Results tab (rows or plan lines).
    pub results_scroll: usize,
    /// First visible column in the result grid.
    pub column_offset: usize,
    /// Temporary status message shown in the header.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(form: QueryForm, ssl_mode: SslMode) -> Self {
        Self {
            form,
            ssl_mode,
            ..Self::default()
        }
    }

    pub fn connection_params(&self) -> ConnectionParams {
        self.form.params(self.ssl_mode)
    }

    pub fn switch_tab(&mut self, tab: Tab) {
        self.current_tab = tab;
        self.status_message = None;
    }

    /// Clear action: form, SQL, options and results.
    pub fn clear(&mut self) {
        self.form.clear();
        self.session.clear();
        self.results_scroll = 0;
        self.column_offset = 0;
        self.focus = Field::Host;
        self.current_tab = Tab::Query;
        self.status_message = None;
    }

    /// Resets the Results tab view after a successful action.
    pub fn show_results(&mut self) {
        self.results_scroll = 0;
        self.column_offset = 0;
        self.current_tab = Tab::Results;
    }

    /// Number of scrollable lines in the Results tab.
    pub fn results_len(&self) -> usize {
        use crate::session::ResultsView;
        match &self.session.results {
            ResultsView::Rows(rs) => rs.row_count(),
            ResultsView::Plan { plan, .. } => plan.lines().len(),
            ResultsView::Affected(_) | ResultsView::Empty => 0,
        }
    }
}
