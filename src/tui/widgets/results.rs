//! Results tab: result grid, affected-row notice, or plan text with key metrics.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::explain::{MetricSet, PlanText};
use crate::gateway::ResultSet;
use crate::output::format_affected;
use crate::session::{ResultsView, RunInfo};
use crate::tui::state::AppState;
use crate::tui::style::Styles;

const MIN_COLUMN_WIDTH: usize = 3;
const MAX_COLUMN_WIDTH: usize = 40;

/// Renders the Results tab.
pub fn render_results_tab(frame: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Last run
        Constraint::Min(3),    // Results
    ])
    .split(area);

    frame.render_widget(run_info_line(state.session.last_run.as_ref()), chunks[0]);

    match &state.session.results {
        ResultsView::Empty => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "No results yet. Press F5 to analyze a plan or F6 to execute the query.",
                Styles::dim(),
            )))
            .block(results_block(" Results "));
            frame.render_widget(paragraph, chunks[1]);
        }
        ResultsView::Rows(rs) => render_grid(frame, chunks[1], rs, state),
        ResultsView::Affected(count) => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                format_affected(*count),
                Styles::ok(),
            )))
            .block(results_block(" Results "));
            frame.render_widget(paragraph, chunks[1]);
        }
        ResultsView::Plan { plan, metrics } => {
            render_plan(frame, chunks[1], plan, metrics, state.results_scroll)
        }
    }
}

fn results_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Styles::border())
}

fn run_info_line(last_run: Option<&RunInfo>) -> Paragraph<'static> {
    let text = match last_run {
        Some(run) => format!(
            " {} finished at {} in {} ms",
            run.action.name(),
            run.finished_at.format("%H:%M:%S"),
            run.elapsed.as_millis()
        ),
        None => String::new(),
    };
    Paragraph::new(text).style(Styles::dim())
}

fn column_width(rs: &ResultSet, idx: usize) -> usize {
    let header = rs.columns.get(idx).map(|c| c.chars().count()).unwrap_or(0);
    rs.rows
        .iter()
        .filter_map(|row| row.get(idx))
        .map(|v| v.chars().count())
        .fold(header, usize::max)
        .clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

fn render_grid(frame: &mut Frame, area: Rect, rs: &ResultSet, state: &AppState) {
    let offset = state
        .column_offset
        .min(rs.columns.len().saturating_sub(1));
    let visible: Vec<usize> = (offset..rs.columns.len()).collect();

    let widths: Vec<Constraint> = visible
        .iter()
        .map(|&i| Constraint::Length(column_width(rs, i) as u16))
        .collect();

    let header = Row::new(
        visible
            .iter()
            .map(|&i| Cell::from(rs.columns[i].as_str())),
    )
    .style(Styles::table_header());

    let rows: Vec<Row> = rs
        .rows
        .iter()
        .skip(state.results_scroll)
        .map(|row| {
            Row::new(
                visible
                    .iter()
                    .map(|&i| Cell::from(row.get(i).map(String::as_str).unwrap_or_default())),
            )
        })
        .collect();

    let title = format!(
        " Results: {} rows, {} columns ",
        rs.row_count(),
        rs.columns.len()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .style(Styles::default())
        .block(results_block(&title));
    frame.render_widget(table, area);
}

fn render_plan(
    frame: &mut Frame,
    area: Rect,
    plan: &PlanText,
    metrics: &MetricSet,
    scroll: usize,
) {
    let metrics_height = (metrics.len().max(1) + 3) as u16;
    let chunks = Layout::vertical([
        Constraint::Min(3),                 // Plan text
        Constraint::Length(metrics_height), // Metrics
    ])
    .split(area);

    let lines: Vec<Line> = if plan.is_empty() {
        vec![Line::from(Span::styled("Server returned an empty plan", Styles::dim()))]
    } else {
        plan.lines().iter().map(|l| Line::from(l.as_str())).collect()
    };
    let paragraph = Paragraph::new(lines)
        .style(Styles::default())
        .scroll((scroll.min(u16::MAX as usize) as u16, 0))
        .block(results_block(" Query plan "));
    frame.render_widget(paragraph, chunks[0]);

    let block = results_block(" Key metrics ");
    if metrics.is_empty() {
        let paragraph = Paragraph::new(Span::styled("No metrics found in plan", Styles::dim()))
            .block(block);
        frame.render_widget(paragraph, chunks[1]);
        return;
    }

    let rows: Vec<Row> = metrics
        .iter()
        .map(|m| {
            Row::new(vec![
                Cell::from(m.label),
                Cell::from(Span::styled(m.value.as_str(), Styles::status())),
            ])
        })
        .collect();
    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(10)])
        .header(Row::new(vec!["Metric", "Value"]).style(Styles::table_header()))
        .block(block);
    frame.render_widget(table, chunks[1]);
}
