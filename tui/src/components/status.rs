use liveview_core::NoticeLevel;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use crate::state::AppState;

/// Component for rendering the status line
pub struct StatusComponent;

impl StatusComponent {
    /// Render the newest notice, or the idle status when there is none
    pub fn render(state: &AppState, f: &mut Frame, area: Rect) {
        if let Some(notice) = state.shell.notices().next() {
            let color = match notice.level {
                NoticeLevel::Info => Color::Cyan,
                NoticeLevel::Error => Color::Red,
            };
            let status = Paragraph::new(notice.text.clone()).style(Style::default().fg(color));
            f.render_widget(status, area);
            return;
        }

        let in_flight = state.shell.in_flight_count();
        let gateway = state.shell.gateway_info();
        let status_text = format!(
            "Ready - {} | {} in flight | Tab to switch, Enter to activate, Ctrl+C to quit",
            gateway.name, in_flight
        );

        let status = Paragraph::new(status_text)
            .style(if in_flight > 0 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::Green)
            });

        f.render_widget(status, area);
    }
}
