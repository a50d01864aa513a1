pub mod shell_tests;

// Test utilities
use crate::events::{AppEvent, EventBus, EventSender};
use crate::gateway::{CommandGateway, LocalGateway, RecordingGateway};
use crate::protocol::Command;
use crate::shell::ViewShell;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Test helper to setup an event bus for testing
pub fn setup_event_bus() -> (EventSender, mpsc::UnboundedReceiver<AppEvent>) {
    let bus = EventBus::new();
    let sender = bus.sender();
    let receiver = bus.into_receiver();
    (sender, receiver)
}

/// Local backend that answers immediately
pub fn instant_backend() -> LocalGateway {
    LocalGateway::new().with_delay(Duration::ZERO)
}

/// Wrap a backend so the test can inspect what reached it
pub fn recording(backend: LocalGateway) -> Arc<RecordingGateway> {
    Arc::new(RecordingGateway::new(Arc::new(backend)))
}

/// Test helper to build a shell wired to `gateway`
pub fn setup_shell(gateway: Arc<dyn CommandGateway>) -> (ViewShell, mpsc::UnboundedReceiver<AppEvent>) {
    let (sender, receiver) = setup_event_bus();
    (ViewShell::new(gateway, sender), receiver)
}

/// Feed bus events back into the shell until nothing is in flight
pub async fn settle(shell: &mut ViewShell, receiver: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut seen = Vec::new();
    while shell.in_flight_count() > 0 {
        let event = tokio::time::timeout(Duration::from_secs(2), receiver.recv())
            .await
            .expect("Timed out waiting for gateway")
            .expect("Event channel closed");
        seen.push(event.clone());
        shell.handle_event(event);
    }
    while let Ok(event) = receiver.try_recv() {
        seen.push(event.clone());
        shell.handle_event(event);
    }
    seen
}

/// Commands announced on the bus, in dispatch order
pub fn issued_commands(events: &[AppEvent]) -> Vec<Command> {
    events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandIssued { command, .. } => Some(command.clone()),
            _ => None,
        })
        .collect()
}
