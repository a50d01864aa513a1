/// Utility functions for the TUI application

/// Terminal management utilities
pub mod terminal {
    use anyhow::Result;
    use crossterm::{
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{backend::CrosstermBackend, Terminal};
    use std::io;

    /// Setup terminal for TUI mode
    pub fn setup() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore terminal to normal mode
    pub fn restore<B: ratatui::backend::Backend + std::io::Write>(terminal: &mut Terminal<B>) -> Result<()> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Leave raw mode and the alternate screen before the default panic output
    pub fn install_panic_hook() {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));
    }
}

/// Layout calculation utilities
pub mod layout {
    use ratatui::layout::{Constraint, Direction, Layout, Rect};

    /// Areas of the main screen, top to bottom
    pub struct MainLayout {
        pub preview: Rect,
        pub button: Rect,
        pub thresholds: Rect,
        pub name: Rect,
        pub greeting: Rect,
        pub status: Rect,
    }

    /// Create the main application layout
    pub fn create_main_layout(area: Rect) -> MainLayout {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(3),     // Live preview
                Constraint::Length(3),  // Live view button
                Constraint::Length(4),  // Min / Max inputs (box + error line)
                Constraint::Length(3),  // Name input
                Constraint::Length(2),  // Greeting
                Constraint::Length(1),  // Status line
            ].as_ref())
            .split(area);

        MainLayout {
            preview: chunks[0],
            button: chunks[1],
            thresholds: chunks[2],
            name: chunks[3],
            greeting: chunks[4],
            status: chunks[5],
        }
    }

    /// Split the threshold row into the min and max columns
    pub fn create_threshold_layout(area: Rect) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(50),
                Constraint::Percentage(50),
            ].as_ref())
            .split(area)
            .to_vec()
    }

    /// Center a fixed-width box horizontally within `area`
    pub fn centered(area: Rect, width: u16) -> Rect {
        let width = width.min(area.width);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y,
            width,
            height: area.height,
        }
    }
}
