use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use crate::state::{AppState, Focus};

/// Component for rendering the greet form and its result
pub struct GreetComponent;

impl GreetComponent {
    /// Render the name input
    pub fn render_input(state: &AppState, f: &mut Frame, area: Rect) {
        let focused = state.focus == Focus::Name;
        let name = state.shell.name();

        let border_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        let title = if focused {
            " Name (Enter to greet) "
        } else {
            " Name "
        };

        let content = if name.is_empty() && !focused {
            Span::styled("Enter a name...", Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(name.to_string())
        };

        let input = Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        );
        f.render_widget(input, area);

        // Render cursor if focused and visible
        if focused && state.cursor_visible {
            let cursor = state.name_cursor.min(name.len());
            let cursor_x = area.x + 1 + name[..cursor].chars().count() as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }

    /// Render the last greeting returned by the backend
    pub fn render_greeting(state: &AppState, f: &mut Frame, area: Rect) {
        let greeting = state.shell.greeting();
        if greeting.is_empty() {
            return;
        }
        let line = Line::from(Span::styled(
            greeting.to_string(),
            Style::default().fg(Color::Cyan),
        ));
        f.render_widget(Paragraph::new(line), area);
    }
}
