//! Exit confirmation dialog.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::style::Styles;

const DIALOG_WIDTH: u16 = 44;
const DIALOG_HEIGHT: u16 = 7;

/// Key hints as (keys, effect), matching the quit dialog key handler.
const CHOICES: [(&[&str], &str); 2] = [(&["Enter", "y", "q"], "quit"), (&["Esc", "n"], "stay")];

fn choice_line(keys: &[&str], effect: &str) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled("/", Styles::help()));
        }
        spans.push(Span::styled(key.to_string(), Styles::help_key()));
    }
    spans.push(Span::styled(format!("  {}", effect), Styles::help()));
    Line::from(spans)
}

/// Draws the exit dialog in the middle of `area`, clipped to it.
pub fn render_quit_confirm(frame: &mut Frame, area: Rect) {
    let width = DIALOG_WIDTH.min(area.width);
    let height = DIALOG_HEIGHT.min(area.height);
    let dialog = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
    .intersection(area);

    frame.render_widget(Clear, dialog);

    let mut lines = vec![
        Line::from(Span::styled("Leave pgxplain?", Styles::section_header())),
        Line::from(""),
    ];
    lines.extend(CHOICES.iter().map(|(keys, effect)| choice_line(keys, effect)));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Styles::default())
        .block(
            Block::default()
                .title(" Exit pgxplain ")
                .borders(Borders::ALL)
                .border_style(Styles::border_focused()),
        );
    frame.render_widget(paragraph, dialog);
}
