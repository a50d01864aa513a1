use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tracing::debug;

use crate::state::{AppState, Focus};

/// Handles input events for the application
pub struct InputHandler;

impl InputHandler {
    /// Handle input events (keyboard only; mouse and resize are ignored)
    pub fn handle_event(state: &mut AppState, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                Self::handle_key_event(state, key.code, key.modifiers);
            }
        }
    }

    fn handle_key_event(state: &mut AppState, key_code: KeyCode, modifiers: KeyModifiers) {
        match key_code {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                state.should_quit = true;
            }
            // Other Ctrl/Alt chords are not text
            KeyCode::Char(_) if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {}
            KeyCode::Tab | KeyCode::Down => {
                state.focus = state.focus.next();
            }
            KeyCode::BackTab | KeyCode::Up => {
                state.focus = state.focus.prev();
            }
            KeyCode::Esc => {
                state.focus = Focus::LiveView;
            }
            _ => match state.focus {
                Focus::LiveView => Self::handle_button_key(state, key_code),
                Focus::MinThreshold | Focus::MaxThreshold => Self::handle_threshold_key(state, key_code),
                Focus::Name => Self::handle_name_key(state, key_code),
            },
        }
    }

    fn handle_button_key(state: &mut AppState, key_code: KeyCode) {
        match key_code {
            KeyCode::Enter | KeyCode::Char(' ') => {
                if state.shell.toggle_live_view().is_none() {
                    debug!("Live view button is disabled");
                }
            }
            KeyCode::Char('q') => {
                state.should_quit = true;
            }
            _ => {}
        }
    }

    fn handle_threshold_key(state: &mut AppState, key_code: KeyCode) {
        let current = match state.focus {
            Focus::MinThreshold => state.shell.min_threshold().text(),
            _ => state.shell.max_threshold().text(),
        };

        let edited = match key_code {
            KeyCode::Char(c) => {
                let mut text = current.to_string();
                text.push(c);
                text
            }
            KeyCode::Backspace => {
                let mut text = current.to_string();
                text.pop();
                text
            }
            KeyCode::Enter => {
                state.shell.flush_thresholds();
                return;
            }
            _ => return,
        };

        let now = Instant::now();
        match state.focus {
            Focus::MinThreshold => state.shell.edit_min_threshold(&edited, now),
            _ => state.shell.edit_max_threshold(&edited, now),
        };
    }

    fn handle_name_key(state: &mut AppState, key_code: KeyCode) {
        match key_code {
            KeyCode::Enter => {
                state.shell.greet();
            }
            KeyCode::Char(c) => Self::insert_char(state, c),
            KeyCode::Backspace => Self::delete_char(state),
            KeyCode::Left => Self::move_cursor_left(state),
            KeyCode::Right => Self::move_cursor_right(state),
            KeyCode::Home => state.name_cursor = 0,
            KeyCode::End => state.name_cursor = state.shell.name().len(),
            _ => {}
        }
    }

    /// Insert a character at the cursor position
    fn insert_char(state: &mut AppState, ch: char) {
        let mut name = state.shell.name().to_string();
        let cursor = state.name_cursor.min(name.len());
        name.insert(cursor, ch);
        state.name_cursor = cursor + ch.len_utf8();
        state.shell.edit_name(name);
    }

    /// Delete character before cursor
    fn delete_char(state: &mut AppState) {
        let mut name = state.shell.name().to_string();
        let cursor = state.name_cursor.min(name.len());
        if let Some((start, _)) = name[..cursor].char_indices().next_back() {
            name.remove(start);
            state.name_cursor = start;
            state.shell.edit_name(name);
        }
    }

    /// Move cursor left
    fn move_cursor_left(state: &mut AppState) {
        let name = state.shell.name();
        if let Some((start, _)) = name[..state.name_cursor.min(name.len())].char_indices().next_back() {
            state.name_cursor = start;
        }
    }

    /// Move cursor right
    fn move_cursor_right(state: &mut AppState) {
        let name = state.shell.name();
        let cursor = state.name_cursor.min(name.len());
        if let Some(ch) = name[cursor..].chars().next() {
            state.name_cursor = cursor + ch.len_utf8();
        }
    }
}
