//! TUI widgets for pgxplain.

mod error_popup;
mod header;
mod help;
mod query;
mod quit_confirm;
mod results;

pub use error_popup::render_error_popup;
pub use header::{render_footer, render_header};
pub use help::render_help;
pub use query::render_query_tab;
pub use quit_confirm::render_quit_confirm;
pub use results::render_results_tab;
