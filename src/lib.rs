//! pgxplain - PostgreSQL EXPLAIN workbench library.
//!
//! This library provides the core functionality used by the `pgxplain` binary:
//! - `gateway` - one-shot statement execution against a server
//! - `explain` - EXPLAIN statement building and plan metric scraping
//! - `session` - explain/execute actions and the last results
//! - `output` - text and JSON rendering for batch mode
//! - `tui` - interactive terminal UI

pub mod error;
pub mod explain;
pub mod gateway;
pub mod output;
pub mod session;
pub mod tui;
