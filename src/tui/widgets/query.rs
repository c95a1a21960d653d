//! Query tab: connection form, SQL editor, EXPLAIN options and action buttons.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::state::{AppState, Field};
use crate::tui::style::Styles;

const CONNECTION_FIELDS: [Field; 5] = [
    Field::Host,
    Field::Port,
    Field::Database,
    Field::User,
    Field::Password,
];
const OPTION_FIELDS: [Field; 3] = [Field::Analyze, Field::Verbose, Field::Buffers];
const BUTTONS: [Field; 3] = [Field::AnalyzeButton, Field::ExecuteButton, Field::ClearButton];

const CURSOR: &str = "█";

/// Renders the Query tab.
pub fn render_query_tab(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(CONNECTION_FIELDS.len() as u16 + 2), // Connection
        Constraint::Min(5),                                     // SQL
        Constraint::Length(3),                                  // Options
        Constraint::Length(1),                                  // Buttons
    ])
    .split(area);

    render_connection(frame, chunks[0], state);
    render_sql(frame, chunks[1], state);
    render_options(frame, chunks[2], state);
    render_buttons(frame, chunks[3], state);
}

fn block(title: &'static str, focused: bool) -> Block<'static> {
    let border = if focused {
        Styles::border_focused()
    } else {
        Styles::border()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border)
}

fn render_connection(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = CONNECTION_FIELDS.contains(&state.focus);
    let lines: Vec<Line> = CONNECTION_FIELDS
        .iter()
        .map(|&field| {
            let raw = state.form.text(field).unwrap_or_default();
            let mut value = if field == Field::Password {
                "*".repeat(raw.chars().count())
            } else {
                raw.to_string()
            };
            let is_focused = state.focus == field;
            if is_focused {
                value.push_str(CURSOR);
            }
            let label_style = if is_focused {
                Styles::selected()
            } else {
                Styles::dim()
            };
            Line::from(vec![
                Span::styled(format!(" {:<10}", field.label()), label_style),
                Span::styled(value, Styles::input()),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block(" Connection ", focused));
    frame.render_widget(paragraph, area);
}

fn render_sql(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.focus == Field::Sql;
    let mut lines: Vec<Line> = state
        .form
        .sql
        .split('\n')
        .map(|l| Line::from(l.to_string()))
        .collect();
    if focused {
        if let Some(last) = lines.last_mut() {
            last.push_span(Span::raw(CURSOR));
        }
    } else if state.form.sql.is_empty() {
        lines = vec![Line::from(Span::styled(
            "Type a SQL statement here",
            Styles::dim(),
        ))];
    }

    // Keep the end of the text in view.
    let visible = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible) as u16;

    let paragraph = Paragraph::new(lines)
        .style(Styles::default())
        .scroll((scroll, 0))
        .block(block(" SQL ", focused));
    frame.render_widget(paragraph, area);
}

fn render_options(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = OPTION_FIELDS.contains(&state.focus);
    let mut spans = Vec::new();
    for field in OPTION_FIELDS {
        let checked = state.form.option(field).unwrap_or(false);
        let mark = if checked { "[x]" } else { "[ ]" };
        let style = if state.focus == field {
            Styles::selected()
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {} {} ", mark, field.label()), style));
        spans.push(Span::raw("  "));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(block(" EXPLAIN options ", focused));
    frame.render_widget(paragraph, area);
}

fn render_buttons(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::raw(" ")];
    for field in BUTTONS {
        let style = if state.focus == field {
            Styles::selected()
        } else if field == Field::AnalyzeButton {
            Styles::primary_button()
        } else {
            Styles::header()
        };
        spans.push(Span::styled(format!(" {} ", field.label()), style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
