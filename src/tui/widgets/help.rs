//! Help popup widget with the key reference.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::style::Styles;

/// Renders the help popup centered on screen with scroll support.
pub fn render_help(frame: &mut Frame, area: Rect, scroll: &mut usize) {
    // Calculate popup size (60% width, 80% height, clamped to 40-80 x 10-30)
    let popup_width = (area.width * 60 / 100).clamp(40, 80);
    let popup_height = (area.height * 80 / 100).clamp(10, 30);

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    // Small terminals get the popup clipped to the frame.
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    // Clear the area behind popup
    frame.render_widget(Clear, popup_area);

    let content = help_lines();
    let content_lines = content.len();

    let block = Block::default()
        .title(" pgxplain Help ")
        .borders(Borders::ALL)
        .border_style(Styles::border());

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Split inner area: content + footer
    let chunks = Layout::vertical([
        Constraint::Min(1),    // Content
        Constraint::Length(1), // Footer
    ])
    .split(inner);

    let visible_height = chunks[0].height as usize;

    // Clamp scroll to valid range
    let max_scroll = content_lines.saturating_sub(visible_height);
    if *scroll > max_scroll {
        *scroll = max_scroll;
    }

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .scroll((*scroll as u16, 0))
        .style(Styles::default());
    frame.render_widget(paragraph, chunks[0]);

    let scroll_info = if max_scroll > 0 {
        format!(" [{}/{}]", *scroll + 1, max_scroll + 1)
    } else {
        String::new()
    };
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Esc", Styles::help_key()),
        Span::styled("/", Styles::help()),
        Span::styled("F1", Styles::help_key()),
        Span::styled(" close  ", Styles::help()),
        Span::styled("↑↓", Styles::help_key()),
        Span::styled(" scroll", Styles::help()),
        Span::styled(scroll_info, Styles::help()),
    ]));
    frame.render_widget(footer, chunks[1]);
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Styles::section_header()))
}

fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<14}", key), Styles::tab_active()),
        Span::raw(description),
    ])
}

fn help_lines() -> Vec<Line<'static>> {
    vec![
        section("Global"),
        key_line("F1", "this help"),
        key_line("F2 / F3", "Query / Results tab"),
        key_line("F5", "analyze plan (EXPLAIN with selected options)"),
        key_line("F6", "execute the statement"),
        key_line("F8", "clear form and results"),
        key_line("Ctrl-Q", "quit (with confirmation)"),
        key_line("Ctrl-C", "quit immediately"),
        Line::from(""),
        section("Query tab"),
        key_line("Tab / S-Tab", "next / previous field"),
        key_line("↑ ↓", "previous / next field (outside the SQL editor)"),
        key_line("Enter", "next field; newline in SQL; press a button"),
        key_line("Space", "toggle ANALYZE / VERBOSE / BUFFERS, press a button"),
        key_line("Backspace", "delete last character"),
        key_line("Ctrl-U", "clear the focused field"),
        key_line("q / ?", "quit / help (outside text fields)"),
        Line::from(""),
        section("Results tab"),
        key_line("↑ ↓ j k", "scroll rows or plan lines"),
        key_line("PgUp PgDn", "scroll by page"),
        key_line("Home End g G", "first / last line"),
        key_line("← → h l", "scroll result columns"),
        key_line("Tab / 1 / Esc", "back to the Query tab"),
        key_line("q", "quit"),
        Line::from(""),
        section("Key metrics"),
        Line::from("  Scraped from the first occurrence of each marker in the plan text:"),
        key_line("Total cost", "upper bound of the first cost=a..b"),
        key_line("Execution time", "upper bound of the first actual time=a..b (ANALYZE)"),
        key_line("Row count", "first rows= value, as printed"),
        key_line("Buffer usage", "rest of the first Buffers: line (BUFFERS)"),
        Line::from(""),
        Line::from(Span::styled(
            "ANALYZE runs the statement; its changes are rolled back, never committed.",
            Styles::dim(),
        )),
    ]
}
