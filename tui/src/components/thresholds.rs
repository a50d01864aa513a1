use liveview_core::threshold::ThresholdField;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use crate::state::{AppState, Focus};
use crate::utils::layout;

/// Component for rendering the min/max threshold inputs
pub struct ThresholdsComponent;

impl ThresholdsComponent {
    pub fn render(state: &AppState, f: &mut Frame, area: Rect) {
        let columns = layout::create_threshold_layout(area);
        let config = state.shell.threshold_config();

        Self::render_field(
            state,
            f,
            columns[0],
            state.shell.min_threshold(),
            config.default_min,
            state.focus == Focus::MinThreshold,
        );
        Self::render_field(
            state,
            f,
            columns[1],
            state.shell.max_threshold(),
            config.default_max,
            state.focus == Focus::MaxThreshold,
        );
    }

    fn render_field(
        state: &AppState,
        f: &mut Frame,
        area: Rect,
        field: &ThresholdField,
        placeholder: i32,
        focused: bool,
    ) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1)].as_ref())
            .split(area);

        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let content = if field.text().is_empty() {
            Line::from(Span::styled(
                placeholder.to_string(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let mut spans = vec![Span::raw(field.text().to_string())];
            if let Some(pending) = field.pending_value() {
                spans.push(Span::styled(
                    format!("  (sending {})", pending),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        };

        let input = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {}: ", field.kind())),
        );
        f.render_widget(input, rows[0]);

        if let Some(error) = field.error() {
            let message = Paragraph::new(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            ));
            f.render_widget(message, rows[1]);
        }

        if focused && state.cursor_visible {
            let cursor_x = rows[0].x + 1 + field.text().chars().count() as u16;
            let cursor_y = rows[0].y + 1;
            if cursor_x < rows[0].x + rows[0].width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}
