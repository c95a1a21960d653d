//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::session::Action;

use super::state::{AppState, Field, PopupState, Tab};

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// No action, continue.
    None,
    /// Quit the application.
    Quit,
    /// Run EXPLAIN or the statement itself.
    Run(Action),
    /// Clear the form and the results.
    Clear,
}

/// Handles key input and updates state.
pub fn handle_key(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }

    match state.popup {
        PopupState::None => {}
        PopupState::QuitConfirm => return handle_quit_confirm(state, key),
        PopupState::Help { .. } => return handle_help(state, key),
        PopupState::Error { .. } => return handle_error_popup(state, key),
    }

    // Global keys
    match key.code {
        KeyCode::F(1) => {
            state.popup = PopupState::Help { scroll: 0 };
            return KeyAction::None;
        }
        KeyCode::F(2) => {
            state.switch_tab(Tab::Query);
            return KeyAction::None;
        }
        KeyCode::F(3) => {
            state.switch_tab(Tab::Results);
            return KeyAction::None;
        }
        KeyCode::F(5) => return KeyAction::Run(Action::Explain),
        KeyCode::F(6) => return KeyAction::Run(Action::Execute),
        KeyCode::F(8) => return KeyAction::Clear,
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.popup = PopupState::QuitConfirm;
            return KeyAction::None;
        }
        _ => {}
    }

    match state.current_tab {
        Tab::Query => handle_query_tab(state, key),
        Tab::Results => handle_results_tab(state, key),
    }
}

fn handle_quit_confirm(state: &mut AppState, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Char('y') => {
            state.popup = PopupState::None;
            KeyAction::Quit
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            state.popup = PopupState::None;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

fn handle_help(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if matches!(
        key.code,
        KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
    ) {
        state.popup = PopupState::None;
        return KeyAction::None;
    }
    if let PopupState::Help { scroll } = &mut state.popup {
        // Clamped during render
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::PageDown => *scroll = scroll.saturating_add(10),
            KeyCode::PageUp => *scroll = scroll.saturating_sub(10),
            _ => {}
        }
    }
    KeyAction::None
}

fn handle_error_popup(state: &mut AppState, key: KeyEvent) -> KeyAction {
    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ')) {
        state.popup = PopupState::None;
    }
    KeyAction::None
}

/// Keys on the Query tab: focus movement, text editing, toggles, buttons.
fn handle_query_tab(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let focus = state.focus;
    match key.code {
        KeyCode::Tab => {
            state.focus = focus.next();
            KeyAction::None
        }
        KeyCode::BackTab => {
            state.focus = focus.prev();
            KeyAction::None
        }
        // Arrows move focus everywhere except the SQL editor.
        KeyCode::Down if focus != Field::Sql => {
            state.focus = focus.next();
            KeyAction::None
        }
        KeyCode::Up if focus != Field::Sql => {
            state.focus = focus.prev();
            KeyAction::None
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = state.form.text_mut(focus) {
                text.clear();
            }
            KeyAction::None
        }
        KeyCode::Char(c) if focus.is_text() && !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = state.form.text_mut(focus) {
                text.push(c);
            }
            KeyAction::None
        }
        KeyCode::Backspace => {
            if let Some(text) = state.form.text_mut(focus) {
                text.pop();
            }
            KeyAction::None
        }
        KeyCode::Enter if focus == Field::Sql => {
            state.form.sql.push('\n');
            KeyAction::None
        }
        KeyCode::Enter if focus.is_text() => {
            state.focus = focus.next();
            KeyAction::None
        }
        KeyCode::Enter | KeyCode::Char(' ') => activate(state, focus),
        KeyCode::Char('?') => {
            state.popup = PopupState::Help { scroll: 0 };
            KeyAction::None
        }
        KeyCode::Char('q') => {
            state.popup = PopupState::QuitConfirm;
            KeyAction::None
        }
        _ => KeyAction::None,
    }
}

/// Space/Enter on a toggle or a button.
fn activate(state: &mut AppState, focus: Field) -> KeyAction {
    match focus {
        f if f.is_toggle() => {
            state.form.toggle(focus);
            KeyAction::None
        }
        Field::AnalyzeButton => KeyAction::Run(Action::Explain),
        Field::ExecuteButton => KeyAction::Run(Action::Execute),
        Field::ClearButton => KeyAction::Clear,
        _ => KeyAction::None,
    }
}

/// Keys on the Results tab: scrolling and tab switching.
fn handle_results_tab(state: &mut AppState, key: KeyEvent) -> KeyAction {
    let len = state.results_len();
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Char('1') | KeyCode::Esc => {
            state.switch_tab(Tab::Query);
        }
        KeyCode::Char('2') => state.switch_tab(Tab::Results),
        KeyCode::Char('q') | KeyCode::Char('Q') => state.popup = PopupState::QuitConfirm,
        KeyCode::Char('?') => state.popup = PopupState::Help { scroll: 0 },
        KeyCode::Down | KeyCode::Char('j') => {
            state.results_scroll = (state.results_scroll + 1).min(len.saturating_sub(1));
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.results_scroll = state.results_scroll.saturating_sub(1);
        }
        KeyCode::PageDown => {
            state.results_scroll = (state.results_scroll + 20).min(len.saturating_sub(1));
        }
        KeyCode::PageUp => state.results_scroll = state.results_scroll.saturating_sub(20),
        KeyCode::Home | KeyCode::Char('g') => state.results_scroll = 0,
        KeyCode::End | KeyCode::Char('G') => state.results_scroll = len.saturating_sub(1),
        KeyCode::Right | KeyCode::Char('l') => {
            let columns = state
                .session
                .results
                .result_set()
                .map_or(0, |rs| rs.columns.len());
            state.column_offset = (state.column_offset + 1).min(columns.saturating_sub(1));
        }
        KeyCode::Left | KeyCode::Char('h') => {
            state.column_offset = state.column_offset.saturating_sub(1);
        }
        _ => {}
    }
    KeyAction::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{ResultSet, SslMode};
    use crate::session::ResultsView;
    use crate::tui::state::QueryForm;
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn state() -> AppState {
        AppState::new(QueryForm::default(), SslMode::Disable)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(state, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn typing_fills_focused_field() {
        let mut state = state();
        type_text(&mut state, "db.local");
        assert_eq!(state.form.host, "db.local");

        handle_key(&mut state, key(KeyCode::Backspace));
        assert_eq!(state.form.host, "db.loca");

        // Enter moves on from single-line fields.
        handle_key(&mut state, key(KeyCode::Enter));
        assert_eq!(state.focus, Field::Port);
        handle_key(&mut state, ctrl('u'));
        type_text(&mut state, "6432");
        assert_eq!(state.form.port, "6432");
    }

    #[test]
    fn sql_editor_accepts_newlines_and_q() {
        let mut state = state();
        state.focus = Field::Sql;
        type_text(&mut state, "SELECT q");
        handle_key(&mut state, key(KeyCode::Enter));
        type_text(&mut state, "FROM t");
        assert_eq!(state.form.sql, "SELECT q\nFROM t");
        assert_eq!(state.popup, PopupState::None);
    }

    #[test]
    fn space_toggles_options() {
        let mut state = state();
        state.focus = Field::Verbose;
        handle_key(&mut state, key(KeyCode::Char(' ')));
        assert!(state.form.options.verbose);
        handle_key(&mut state, key(KeyCode::Enter));
        assert!(!state.form.options.verbose);
    }

    #[test]
    fn buttons_and_function_keys_trigger_actions() {
        let mut state = state();
        state.focus = Field::AnalyzeButton;
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Enter)),
            KeyAction::Run(Action::Explain)
        );
        state.focus = Field::ExecuteButton;
        assert_eq!(
            handle_key(&mut state, key(KeyCode::Char(' '))),
            KeyAction::Run(Action::Execute)
        );
        state.focus = Field::ClearButton;
        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), KeyAction::Clear);

        state.focus = Field::Sql;
        assert_eq!(
            handle_key(&mut state, key(KeyCode::F(5))),
            KeyAction::Run(Action::Explain)
        );
        assert_eq!(
            handle_key(&mut state, key(KeyCode::F(6))),
            KeyAction::Run(Action::Execute)
        );
        assert_eq!(handle_key(&mut state, key(KeyCode::F(8))), KeyAction::Clear);
    }

    #[test]
    fn tab_and_arrows_move_focus() {
        let mut state = state();
        handle_key(&mut state, key(KeyCode::Tab));
        assert_eq!(state.focus, Field::Port);
        handle_key(&mut state, key(KeyCode::BackTab));
        handle_key(&mut state, key(KeyCode::BackTab));
        assert_eq!(state.focus, Field::ClearButton);
        handle_key(&mut state, key(KeyCode::Down));
        assert_eq!(state.focus, Field::Host);
    }

    #[test]
    fn error_popup_swallows_keys_until_dismissed() {
        let mut state = state();
        state.popup = PopupState::Error {
            title: "Connection error".into(),
            message: "connection refused".into(),
        };
        assert_eq!(handle_key(&mut state, key(KeyCode::F(5))), KeyAction::None);
        assert!(state.popup.is_open());
        handle_key(&mut state, key(KeyCode::Esc));
        assert!(!state.popup.is_open());
    }

    #[test]
    fn quit_flow() {
        let mut state = state();
        state.focus = Field::AnalyzeButton;
        assert_eq!(handle_key(&mut state, key(KeyCode::Char('q'))), KeyAction::None);
        assert_eq!(state.popup, PopupState::QuitConfirm);
        assert_eq!(handle_key(&mut state, key(KeyCode::Esc)), KeyAction::None);
        assert_eq!(state.popup, PopupState::None);

        assert_eq!(handle_key(&mut state, ctrl('q')), KeyAction::None);
        assert_eq!(handle_key(&mut state, key(KeyCode::Enter)), KeyAction::Quit);
        assert_eq!(handle_key(&mut state, ctrl('c')), KeyAction::Quit);
    }

    #[test]
    fn results_scroll_is_clamped() {
        let mut state = state();
        state.session.results = ResultsView::Rows(
            ResultSet::new(vec!["a".into(), "b".into()])
                .with_rows(vec![vec!["1".into(), "2".into()]; 3]),
        );
        state.current_tab = Tab::Results;

        for _ in 0..10 {
            handle_key(&mut state, key(KeyCode::Down));
            handle_key(&mut state, key(KeyCode::Right));
        }
        assert_eq!(state.results_scroll, 2);
        assert_eq!(state.column_offset, 1);

        handle_key(&mut state, key(KeyCode::Home));
        assert_eq!(state.results_scroll, 0);
        handle_key(&mut state, key(KeyCode::Tab));
        assert_eq!(state.current_tab, Tab::Query);
    }
}
