//! Modal error dialog.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::style::{Styles, Theme};

/// Renders a centered error dialog; the message wraps inside it.
pub fn render_error_popup(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let popup_width = (area.width * 70 / 100).clamp(40, 100);
    // Rough line estimate for wrapped text plus padding and footer.
    let text_width = popup_width.saturating_sub(4).max(1) as usize;
    let wrapped: usize = message
        .lines()
        .map(|l| l.chars().count().div_ceil(text_width).max(1))
        .sum();
    let popup_height = (wrapped as u16 + 6).clamp(7, area.height.max(7));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height).intersection(area);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), Styles::critical()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Theme::HIGHLIGHT_CRITICAL));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1), // Padding
        Constraint::Min(1),    // Message
        Constraint::Length(1), // Footer
    ])
    .split(inner);

    let text = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White));
    frame.render_widget(text, chunks[1].inner(ratatui::layout::Margin::new(1, 0)));

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::styled(" or ", Style::default().fg(Color::DarkGray)),
        Span::styled("Esc", Style::default().fg(Color::Yellow)),
        Span::styled(" → close", Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[2]);
}
