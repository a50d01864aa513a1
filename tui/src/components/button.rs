use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use crate::state::{AppState, Focus};
use crate::utils::layout;

/// Component for rendering the live view toggle button
pub struct LiveViewButtonComponent;

impl LiveViewButtonComponent {
    pub fn render(state: &AppState, f: &mut Frame, area: Rect) {
        let live_view = state.shell.live_view();
        let label = live_view.button_label();
        let focused = state.focus == Focus::LiveView;

        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        // Disabled while the backend has not confirmed the last click
        let label_style = if live_view.is_busy() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let button = Paragraph::new(label)
            .style(label_style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border_style));

        let width = label.chars().count() as u16 + 6;
        f.render_widget(button, layout::centered(area, width));
    }
}
