//! Main rendering logic for TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use super::state::{AppState, PopupState, Tab};
use super::widgets::{
    render_error_popup, render_footer, render_header, render_help, render_query_tab,
    render_quit_confirm, render_results_tab,
};

/// Main render function.
pub fn render(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Min(10),   // Content area
        Constraint::Length(1), // Key hints
    ])
    .split(area);

    render_header(frame, chunks[0], state);

    match state.current_tab {
        Tab::Query => render_query_tab(frame, chunks[1], state),
        Tab::Results => render_results_tab(frame, chunks[1], state),
    }

    render_footer(frame, chunks[2], state.current_tab);

    // Popups are rendered last to overlay everything
    match &mut state.popup {
        PopupState::None => {}
        PopupState::Help { scroll } => render_help(frame, area, scroll),
        PopupState::QuitConfirm => render_quit_confirm(frame, area),
        PopupState::Error { title, message } => render_error_popup(frame, area, title, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explain::{PlanText, extract};
    use crate::gateway::{ResultSet, SslMode};
    use crate::session::ResultsView;
    use crate::tui::state::QueryForm;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(state: &mut AppState) -> String {
        draw_sized(state, 120, 40)
    }

    fn draw_sized(state: &mut AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn state() -> AppState {
        AppState::new(
            QueryForm {
                host: "localhost".into(),
                user: "postgres".into(),
                password: "hunter2".into(),
                sql: "SELECT * FROM aircrafts_data".into(),
                ..QueryForm::default()
            },
            SslMode::Disable,
        )
    }

    #[test]
    fn query_tab_shows_form_and_masks_password() {
        let mut state = state();
        let screen = draw(&mut state);
        assert!(screen.contains("Connection"));
        assert!(screen.contains("localhost"));
        assert!(screen.contains("SELECT * FROM aircrafts_data"));
        assert!(screen.contains("ANALYZE"));
        assert!(screen.contains("*******"));
        assert!(!screen.contains("hunter2"));
    }

    #[test]
    fn results_tab_shows_plan_and_metrics() {
        let mut state = state();
        let plan = PlanText::new(vec![
            "Seq Scan on aircrafts_data  (cost=0.00..12.34 rows=5 width=52)".to_string(),
        ]);
        let metrics = extract(&plan.text()).unwrap();
        state.session.results = ResultsView::Plan { plan, metrics };
        state.current_tab = Tab::Results;

        let screen = draw(&mut state);
        assert!(screen.contains("Seq Scan on aircrafts_data"));
        assert!(screen.contains("Total cost"));
        assert!(screen.contains("12.34"));
        assert!(screen.contains("Estimated row count"));
    }

    #[test]
    fn results_tab_shows_grid_with_null() {
        let mut state = state();
        state.session.results = ResultsView::Rows(
            ResultSet::new(vec!["aircraft_code".into(), "range".into()])
                .with_rows(vec![vec!["773".into(), "NULL".into()]]),
        );
        state.current_tab = Tab::Results;

        let screen = draw(&mut state);
        assert!(screen.contains("aircraft_code"));
        assert!(screen.contains("773"));
        assert!(screen.contains("NULL"));
    }

    #[test]
    fn results_tab_shows_affected_rows() {
        let mut state = state();
        state.session.results = ResultsView::Affected(12);
        state.current_tab = Tab::Results;

        let screen = draw(&mut state);
        assert!(screen.contains("Rows affected: 12"));
    }

    #[test]
    fn error_popup_is_drawn_on_top() {
        let mut state = state();
        state.popup = PopupState::Error {
            title: "Connection error".into(),
            message: "connection refused".into(),
        };
        let screen = draw(&mut state);
        assert!(screen.contains("Connection error"));
        assert!(screen.contains("connection refused"));
    }

    #[test]
    fn header_names_tab_keys() {
        let mut state = state();
        let screen = draw(&mut state);
        assert!(screen.contains("F2:Query"));
        assert!(screen.contains("F3:Results"));
    }

    #[test]
    fn popups_fit_a_small_terminal() {
        let popups = [
            PopupState::Help { scroll: 0 },
            PopupState::QuitConfirm,
            PopupState::Error {
                title: "Query execution error".into(),
                message: "ERROR: relation \"nope\" does not exist".into(),
            },
        ];
        for popup in popups {
            let mut state = state();
            state.popup = popup;
            draw_sized(&mut state, 30, 20);
            draw_sized(&mut state, 30, 5);
        }
    }

    #[test]
    fn quit_dialog_lists_its_keys() {
        let mut state = state();
        state.popup = PopupState::QuitConfirm;
        let screen = draw(&mut state);
        assert!(screen.contains("Exit pgxplain"));
        assert!(screen.contains("Enter/y/q"));
        assert!(screen.contains("Esc/n"));
    }

    #[test]
    fn empty_plan_gets_placeholder() {
        let mut state = state();
        state.session.results = ResultsView::Plan {
            plan: PlanText::default(),
            metrics: extract("").unwrap(),
        };
        state.current_tab = Tab::Results;

        let screen = draw(&mut state);
        assert!(screen.contains("Server returned an empty plan"));
        assert!(screen.contains("No metrics found in plan"));
    }
}
