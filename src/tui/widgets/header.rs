//! Header widget showing time, tabs and the connection target; key hint footer.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::state::{AppState, Tab};
use crate::tui::style::Styles;

/// Renders the header bar.
pub fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::horizontal([
        Constraint::Length(21), // Time
        Constraint::Length(11), // Title
        Constraint::Length(22), // Tabs
        Constraint::Min(20),    // Target/Status
    ])
    .split(area);

    let time_str = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    frame.render_widget(
        Paragraph::new(format!(" {}", time_str)).style(Styles::header()),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(" pgxplain ").style(Styles::header()),
        chunks[1],
    );

    // Tabs
    let tabs: Vec<Span> = Tab::all()
        .iter()
        .enumerate()
        .flat_map(|(i, tab)| {
            let style = if *tab == state.current_tab {
                Styles::tab_active()
            } else {
                Styles::tab_inactive()
            };
            // F2 opens the first tab.
            let num = format!(" F{}:", i + 2);
            let name = format!("{} ", tab.name());
            vec![Span::styled(num, Styles::dim()), Span::styled(name, style)]
        })
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(tabs)).style(Styles::header()),
        chunks[2],
    );

    let (right_content, right_style) = match &state.status_message {
        Some(msg) => (msg.clone(), Styles::status()),
        None => {
            let params = state.connection_params();
            if params.host.trim().is_empty() {
                ("not connected".to_string(), Styles::header())
            } else {
                (params.describe(), Styles::header())
            }
        }
    };
    frame.render_widget(
        Paragraph::new(right_content)
            .style(right_style)
            .alignment(ratatui::layout::Alignment::Right),
        chunks[3],
    );
}

/// Renders the key hints line for the current tab.
pub fn render_footer(frame: &mut Frame, area: Rect, tab: Tab) {
    let hints: &[(&str, &str)] = match tab {
        Tab::Query => &[
            ("F1", "Help"),
            ("Tab", "Next field"),
            ("F5", "Analyze"),
            ("F6", "Execute"),
            ("F8", "Clear"),
            ("F3", "Results"),
            ("^Q", "Quit"),
        ],
        Tab::Results => &[
            ("F1", "Help"),
            ("↑↓", "Scroll"),
            ("←→", "Columns"),
            ("F2", "Query"),
            ("F5", "Analyze"),
            ("F6", "Execute"),
            ("q", "Quit"),
        ],
    };

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            vec![
                Span::styled(format!(" {}", key), Styles::help_key()),
                Span::styled(format!(" {} ", action), Styles::help()),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
