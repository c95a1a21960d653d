//! Main TUI application.

use std::io;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tracing::{info, warn};

use crate::gateway::Gateway;
use crate::session::Action;

use super::event::{Event, EventHandler};
use super::input::{KeyAction, handle_key};
use super::render::render;
use super::state::{AppState, PopupState};

/// Main TUI application.
pub struct App {
    gateway: Box<dyn Gateway>,
    state: AppState,
    should_quit: bool,
}

impl App {
    /// Creates a new App over the given gateway and initial state.
    pub fn new(gateway: Box<dyn Gateway>, state: AppState) -> Self {
        Self {
            gateway,
            state,
            should_quit: false,
        }
    }

    /// Runs the TUI application.
    pub fn run(mut self, tick_rate: Duration) -> io::Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, tick_rate);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let events = EventHandler::new(tick_rate);

        loop {
            terminal.draw(|frame| render(frame, &mut self.state))?;

            match events.next() {
                Ok(Event::Tick) | Ok(Event::Resize) => {}
                Ok(Event::Key(key)) => match handle_key(&mut self.state, key) {
                    KeyAction::Quit => self.should_quit = true,
                    KeyAction::Run(action) => {
                        // The action blocks; show that it started first.
                        self.state.status_message = Some(format!("Running {}...", action.name()));
                        terminal.draw(|frame| render(frame, &mut self.state))?;
                        self.run_action(action);
                        events.drain();
                    }
                    KeyAction::Clear => {
                        self.state.clear();
                        info!("form cleared");
                    }
                    KeyAction::None => {}
                },
                Err(_) => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Runs an action against the gateway and updates state with the
    /// outcome or an error dialog.
    fn run_action(&mut self, action: Action) {
        let params = self.state.connection_params();
        let request = self.state.form.request();

        match self
            .state
            .session
            .run(action, self.gateway.as_ref(), &params, &request)
        {
            Ok(()) => {
                self.state.show_results();
                self.state.status_message = None;
            }
            Err(e) => {
                warn!(action = action.name(), error = %e, "action failed");
                self.state.status_message = None;
                self.state.popup = PopupState::error(action, &e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QueryToolError;
    use crate::gateway::SslMode;
    use crate::gateway::mock::MockGateway;
    use crate::session::ResultsView;
    use crate::tui::state::{QueryForm, Tab};

    fn app(gateway: MockGateway, sql: &str) -> App {
        let form = QueryForm {
            host: "localhost".into(),
            user: "postgres".into(),
            sql: sql.into(),
            ..QueryForm::default()
        };
        App::new(Box::new(gateway), AppState::new(form, SslMode::Disable))
    }

    #[test]
    fn successful_action_switches_to_results() {
        let mut app = app(
            MockGateway::new().respond_plan("Result  (cost=0.00..0.01 rows=1 width=4)"),
            "SELECT 1",
        );
        app.run_action(Action::Explain);

        assert_eq!(app.state.current_tab, Tab::Results);
        assert_eq!(app.state.popup, PopupState::None);
        assert_eq!(
            app.state.session.results.metrics().unwrap().get("Total cost"),
            Some("0.01")
        );
    }

    #[test]
    fn failed_action_opens_dialog_and_keeps_tab() {
        let mut app = app(
            MockGateway::new().respond_error(QueryToolError::Connection(
                "password authentication failed".into(),
            )),
            "SELECT 1",
        );
        app.run_action(Action::Execute);

        assert_eq!(app.state.current_tab, Tab::Query);
        assert_eq!(app.state.session.results, ResultsView::Empty);
        assert_eq!(
            app.state.popup,
            PopupState::Error {
                title: "Connection error".into(),
                message: "password authentication failed".into(),
            }
        );
    }

    #[test]
    fn empty_sql_opens_validation_dialog() {
        let mut app = app(MockGateway::new(), "   ");
        app.run_action(Action::Explain);

        let PopupState::Error { title, .. } = &app.state.popup else {
            panic!("expected error popup");
        };
        assert_eq!(title, "Invalid input");
    }
}
