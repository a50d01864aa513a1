use crate::gateway::GatewayError;
use crate::protocol::{Command, CommandKind, Reply, RequestId};
use tokio::sync::mpsc;

/// Events that flow through the application
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A command left the view, posted in dispatch order
    CommandIssued { id: RequestId, command: Command },

    /// The gateway answered a command
    CommandSucceeded { id: RequestId, kind: CommandKind, reply: Reply },

    /// The gateway failed a command
    CommandFailed { id: RequestId, kind: CommandKind, error: GatewayError },

    /// Application should quit
    Quit,
}

/// Event bus for communication between components
#[derive(Debug)]
pub struct EventBus {
    sender: mpsc::UnboundedSender<AppEvent>,
    receiver: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Get a sender handle for the event bus
    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: self.sender.clone(),
        }
    }

    /// Get the receiver (should only be used by the main event loop)
    pub fn into_receiver(self) -> mpsc::UnboundedReceiver<AppEvent> {
        self.receiver
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle for sending events to the event bus
#[derive(Debug, Clone)]
pub struct EventSender {
    inner: mpsc::UnboundedSender<AppEvent>,
}

impl EventSender {
    /// Send an event to the bus
    pub fn send(&self, event: AppEvent) -> Result<(), EventSendError> {
        self.inner
            .send(event)
            .map_err(|_| EventSendError::ChannelClosed)
    }

    /// Send the outcome of a gateway call
    pub fn send_outcome(
        &self,
        id: RequestId,
        kind: CommandKind,
        outcome: Result<Reply, GatewayError>,
    ) -> Result<(), EventSendError> {
        match outcome {
            Ok(reply) => self.send(AppEvent::CommandSucceeded { id, kind, reply }),
            Err(error) => self.send(AppEvent::CommandFailed { id, kind, error }),
        }
    }

    /// Send quit signal
    pub fn send_quit(&self) -> Result<(), EventSendError> {
        self.send(AppEvent::Quit)
    }
}

/// Errors that can occur when sending events
#[derive(Debug, thiserror::Error)]
pub enum EventSendError {
    #[error("Event channel is closed")]
    ChannelClosed,
}
