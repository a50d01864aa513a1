use liveview_core::AppEvent;
use tracing::debug;
use crate::state::AppState;

/// Handles application events coming back from the gateway
pub struct EventHandler;

impl EventHandler {
    /// Handle application events
    pub fn handle_event(state: &mut AppState, event: AppEvent) {
        debug!("Handling app event: {:?}", event);
        match event {
            AppEvent::Quit => {
                state.should_quit = true;
            }
            other => state.shell.handle_event(other),
        }
    }
}
