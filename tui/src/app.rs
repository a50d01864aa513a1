use anyhow::Result;
use crossterm::event::{Event, EventStream};
use futures::{Stream, StreamExt};
use liveview_core::{AppEvent, ViewShell};
use ratatui::{backend::Backend, Frame, Terminal};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::{
    components::{
        GreetComponent, LiveViewButtonComponent, PreviewComponent, StatusComponent,
        ThresholdsComponent,
    },
    handlers::{EventHandler, InputHandler},
    state::AppState,
    utils::{layout, terminal},
};

/// Main application
pub struct App {
    state: AppState,
    tick: Duration,
}

impl App {
    /// Create a new application instance
    pub fn new(shell: ViewShell, event_receiver: mpsc::UnboundedReceiver<AppEvent>) -> Self {
        Self {
            state: AppState::new(shell, event_receiver),
            tick: Duration::from_millis(50),
        }
    }

    /// Set how often the loop redraws and runs housekeeping when idle
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Run the application main loop
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        let mut terminal = terminal::setup()?;

        info!("TUI initialized, starting main loop");

        // Main application loop
        let result = self.run_app(&mut terminal, EventStream::new()).await;

        // Restore terminal
        terminal::restore(&mut terminal)?;

        result
    }

    /// Main application loop
    async fn run_app<B, S>(&mut self, terminal: &mut Terminal<B>, events: S) -> Result<()>
    where
        B: Backend,
        S: Stream<Item = std::io::Result<Event>>,
    {
        tokio::pin!(events);
        let mut ticker = tokio::time::interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // Update cursor blinking
            self.state.update_cursor_blink();

            // Draw UI
            terminal.draw(|f| render(f, &self.state))?;

            tokio::select! {
                // Fire debounced threshold edits and expire old notices
                _ = ticker.tick() => {
                    self.state.shell.tick(Instant::now());
                },

                // Handle terminal events (keyboard input)
                terminal_event = events.next() => {
                    match terminal_event {
                        Some(Ok(event)) => InputHandler::handle_event(&mut self.state, event),
                        Some(Err(e)) => warn!("Failed to read terminal event: {}", e),
                        None => self.state.should_quit = true,
                    }
                },

                // Handle gateway outcomes
                Some(app_event) = self.state.event_receiver.recv() => {
                    EventHandler::handle_event(&mut self.state, app_event);
                },
            }

            if self.state.should_quit {
                break;
            }
        }

        info!("Leaving main loop with {} request(s) in flight", self.state.shell.in_flight_count());
        Ok(())
    }
}

/// Draw the whole user interface for `state`
pub fn render(f: &mut Frame, state: &AppState) {
    let areas = layout::create_main_layout(f.size());

    PreviewComponent::render(state, f, areas.preview);
    LiveViewButtonComponent::render(state, f, areas.button);
    ThresholdsComponent::render(state, f, areas.thresholds);
    GreetComponent::render_input(state, f, areas.name);
    GreetComponent::render_greeting(state, f, areas.greeting);
    StatusComponent::render(state, f, areas.status);
}
