//! Terminal User Interface for pgxplain.
//!
//! Two tabs: "Query" (connection form, SQL editor, EXPLAIN options and
//! actions) and "Results" (result grid or plan text plus scraped metrics).
//! Database calls run on the UI thread and block it until they return.

mod app;
mod event;
mod input;
mod render;
mod state;
mod style;
mod widgets;

pub use app::App;
pub use state::{AppState, Field, PopupState, QueryForm, Tab};
