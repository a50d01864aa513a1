use liveview_core::{AppEvent, ViewShell};
use std::time::Instant;
use tokio::sync::mpsc;

/// Control that currently receives keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    LiveView,
    MinThreshold,
    MaxThreshold,
    Name,
}

impl Focus {
    const ORDER: [Focus; 4] = [
        Focus::LiveView,
        Focus::MinThreshold,
        Focus::MaxThreshold,
        Focus::Name,
    ];

    pub fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Application state
pub struct AppState {
    /// The view model that owns all form state
    pub shell: ViewShell,

    /// Focused control
    pub focus: Focus,

    /// Cursor position in the name input (byte index)
    pub name_cursor: usize,

    /// Whether the application should quit
    pub should_quit: bool,

    /// Event receiver for handling app events
    pub event_receiver: mpsc::UnboundedReceiver<AppEvent>,

    /// Whether cursor is visible (for blinking effect)
    pub cursor_visible: bool,

    /// Last time cursor blinked
    pub last_cursor_blink: Instant,
}

impl AppState {
    /// Create a new application state
    pub fn new(shell: ViewShell, event_receiver: mpsc::UnboundedReceiver<AppEvent>) -> Self {
        let name_cursor = shell.name().len();
        Self {
            shell,
            focus: Focus::LiveView,
            name_cursor,
            should_quit: false,
            event_receiver,
            cursor_visible: true,
            last_cursor_blink: Instant::now(),
        }
    }

    /// Update cursor blinking state
    pub fn update_cursor_blink(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_cursor_blink).as_millis() >= 500 {
            self.cursor_visible = !self.cursor_visible;
            self.last_cursor_blink = now;
        }
    }
}
