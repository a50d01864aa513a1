use liveview_core::LiveViewState;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use crate::state::AppState;

/// Component for rendering the live preview panel
pub struct PreviewComponent;

impl PreviewComponent {
    /// Render the preview area with the backend-confirmed live view status
    pub fn render(state: &AppState, f: &mut Frame, area: Rect) {
        let shell = &state.shell;
        let mut lines = Vec::new();

        match shell.live_view() {
            LiveViewState::Stopped => {
                lines.push(Line::from(Span::styled(
                    "Preview stopped",
                    Style::default().fg(Color::DarkGray),
                )));
            }
            LiveViewState::Starting => {
                lines.push(Line::from(Span::styled(
                    "Connecting to live view...",
                    Style::default().fg(Color::Yellow),
                )));
            }
            LiveViewState::Running => {
                lines.push(Line::from(Span::styled(
                    "● LIVE",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!(
                    "threshold {}..{}",
                    shell.min_threshold().confirmed(),
                    shell.max_threshold().confirmed()
                )));
            }
            LiveViewState::Stopping => {
                lines.push(Line::from(Span::styled(
                    "Stopping live view...",
                    Style::default().fg(Color::Yellow),
                )));
            }
            LiveViewState::Failed { during, reason } => {
                lines.push(Line::from(Span::styled(
                    format!("Could not {} live view: {}", during, reason),
                    Style::default().fg(Color::Red),
                )));
            }
        }

        let preview = Paragraph::new(Text::from(lines))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Live View "));

        f.render_widget(preview, area);
    }
}
