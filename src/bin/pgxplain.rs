//! pgxplain - PostgreSQL EXPLAIN workbench.
//!
//! Supports two modes:
//! - Interactive mode (default): terminal UI with connection form and SQL editor
//! - Batch mode (`-c` / `-f`): run one statement and print the outcome
//!
//! Usage:
//!   pgxplain                                 # TUI, connection defaults from PG* env
//!   pgxplain -h db1 -U app -d shop           # TUI with prefilled connection form
//!   pgxplain -c "SELECT 1"                   # execute and print the result grid
//!   pgxplain --analyze -f query.sql          # EXPLAIN ANALYZE and print key metrics
//!   pgxplain --explain --json -c "SELECT 1"  # plan and metrics as JSON

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::{ArgAction, Parser};
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use pgxplain::error::QueryToolError;
use pgxplain::explain::ExplainOptions;
use pgxplain::gateway::{ConnectionParams, PostgresGateway, SslMode};
use pgxplain::output::{OutputFormat, render_outcome, render_report};
use pgxplain::session::{QueryRequest, run_explain, run_statement};
use pgxplain::tui::{App, AppState, QueryForm};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// UI refresh interval (header clock).
const TICK_RATE: Duration = Duration::from_secs(1);

/// PostgreSQL query plan explorer.
#[derive(Parser)]
#[command(
    name = "pgxplain",
    version,
    about = "Inspect PostgreSQL query plans and run ad-hoc statements",
    disable_help_flag = true
)]
struct Args {
    /// Database server host (default: $PGHOST or localhost).
    #[arg(short = 'h', long)]
    host: Option<String>,

    /// Database server port (default: $PGPORT or 5432).
    #[arg(short = 'p', long)]
    port: Option<String>,

    /// Database name (default: $PGDATABASE, else the user name).
    #[arg(short = 'd', long)]
    dbname: Option<String>,

    /// User name (default: $PGUSER or $USER).
    #[arg(short = 'U', long)]
    user: Option<String>,

    /// Password (default: $PGPASSWORD).
    #[arg(long)]
    password: Option<String>,

    /// TLS mode: disable, prefer or require (default: $PGSSLMODE or prefer).
    #[arg(long, value_name = "MODE")]
    sslmode: Option<SslMode>,

    /// Run SQL in batch mode instead of starting the UI.
    #[arg(short = 'c', long, value_name = "SQL", conflicts_with = "file")]
    command: Option<String>,

    /// Read SQL for batch mode from a file.
    #[arg(short = 'f', long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Batch mode: print the plan instead of executing the statement.
    #[arg(long)]
    explain: bool,

    /// Batch EXPLAIN with ANALYZE (executes the statement). Implies --explain.
    #[arg(long)]
    analyze: bool,

    /// Batch EXPLAIN with VERBOSE. Implies --explain.
    #[arg(long)]
    verbose_plan: bool,

    /// Batch EXPLAIN with BUFFERS. Implies --explain.
    #[arg(long)]
    buffers: bool,

    /// Batch output as JSON.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Quiet mode: only log errors.
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write logs to this file. The UI only logs when this is set.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print help.
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

impl Args {
    fn batch_mode(&self) -> bool {
        self.command.is_some() || self.file.is_some()
    }

    fn explain_options(&self) -> ExplainOptions {
        ExplainOptions {
            analyze: self.analyze,
            verbose: self.verbose_plan,
            buffers: self.buffers,
        }
    }

    fn wants_explain(&self) -> bool {
        self.explain || !self.explain_options().is_empty()
    }

    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Environment defaults overridden by explicit flags.
    fn connection_params(&self) -> Result<ConnectionParams, QueryToolError> {
        self.connection_params_from(|name| std::env::var(name).ok())
    }

    /// An explicit `--sslmode` replaces `PGSSLMODE` before it is parsed.
    fn connection_params_from<F>(&self, lookup: F) -> Result<ConnectionParams, QueryToolError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit_ssl = self.sslmode.is_some();
        let mut params = ConnectionParams::from_lookup(|name| {
            if explicit_ssl && name == "PGSSLMODE" {
                None
            } else {
                lookup(name)
            }
        })?;
        if let Some(host) = &self.host {
            params.host = host.clone();
        }
        if let Some(port) = &self.port {
            params.port = port.clone();
        }
        if let Some(dbname) = &self.dbname {
            params.database = dbname.clone();
        }
        if let Some(user) = &self.user {
            params.user = user.clone();
        }
        if let Some(password) = &self.password {
            params.password = password.clone();
        }
        if let Some(ssl_mode) = self.sslmode {
            params.ssl_mode = ssl_mode;
        }
        Ok(params)
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
///
/// Logs go to `log_file` when given, otherwise to stderr. With `to_stderr`
/// unset and no file, logging stays disabled.
fn init_logging(
    verbose: u8,
    quiet: bool,
    log_file: Option<&Path>,
    to_stderr: bool,
) -> Result<(), QueryToolError> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("pgxplain={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    match log_file {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                QueryToolError::Validation(format!(
                    "cannot open log file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if to_stderr => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

/// Loads batch SQL from a file.
fn read_sql_file(path: &Path) -> Result<String, QueryToolError> {
    std::fs::read_to_string(path).map_err(|e| {
        QueryToolError::Validation(format!("cannot read SQL file {}: {}", path.display(), e))
    })
}

fn run_batch(args: &Args, params: &ConnectionParams) -> Result<String, QueryToolError> {
    let sql = match (&args.command, &args.file) {
        (Some(sql), _) => sql.clone(),
        (None, Some(path)) => read_sql_file(path)?,
        (None, None) => String::new(),
    };
    let request = QueryRequest::new(sql, args.explain_options());
    let gateway = PostgresGateway::new();
    let format = args.output_format();

    info!(server = %params.describe(), explain = args.wants_explain(), "batch run");

    if args.wants_explain() {
        let report = run_explain(&gateway, params, &request)?;
        info!(
            plan_lines = report.plan.lines().len(),
            metrics = report.metrics.len(),
            "plan analyzed"
        );
        Ok(render_report(&report, format))
    } else {
        let outcome = run_statement(&gateway, params, &request)?;
        Ok(render_outcome(&outcome, format))
    }
}

fn run_tui(params: &ConnectionParams) -> Result<(), QueryToolError> {
    info!(server = %params.describe(), "starting UI");
    let state = AppState::new(QueryForm::from_params(params), params.ssl_mode);
    App::new(Box::new(PostgresGateway::new()), state)
        .run(TICK_RATE)
        .map_err(|e| QueryToolError::Execution(format!("terminal error: {}", e)))
}

fn main() {
    let args = Args::parse();
    let batch = args.batch_mode();

    if let Err(e) = init_logging(args.verbose, args.quiet, args.log_file.as_deref(), batch) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let result = args.connection_params().and_then(|params| {
        if batch {
            run_batch(&args, &params).map(|out| println!("{}", out))
        } else {
            run_tui(&params)
        }
    });

    if let Err(e) = result {
        error!(kind = e.kind(), "{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
