use crate::protocol::Command;
use std::fmt;

/// Direction of a live view change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Start,
    Stop,
}

impl Transition {
    pub fn command(&self) -> Command {
        match self {
            Transition::Start => Command::StartLiveView,
            Transition::Stop => Command::StopLiveView,
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Start => f.write_str("start"),
            Transition::Stop => f.write_str("stop"),
        }
    }
}

/// Live view status as last confirmed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LiveViewState {
    #[default]
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed { during: Transition, reason: String },
}

impl LiveViewState {
    /// Transition a click would request, or `None` while one is in flight
    pub fn next_transition(&self) -> Option<Transition> {
        match self {
            LiveViewState::Stopped => Some(Transition::Start),
            LiveViewState::Running => Some(Transition::Stop),
            LiveViewState::Failed { during, .. } => Some(*during),
            LiveViewState::Starting | LiveViewState::Stopping => None,
        }
    }

    pub fn begin(&mut self, transition: Transition) {
        *self = match transition {
            Transition::Start => LiveViewState::Starting,
            Transition::Stop => LiveViewState::Stopping,
        };
    }

    /// Settle an in-flight transition. Returns false for a stray acknowledgment.
    pub fn acknowledge(&mut self, transition: Transition) -> bool {
        let next = match (&*self, transition) {
            (LiveViewState::Starting, Transition::Start) => LiveViewState::Running,
            (LiveViewState::Stopping, Transition::Stop) => LiveViewState::Stopped,
            _ => return false,
        };
        *self = next;
        true
    }

    pub fn fail(&mut self, transition: Transition, reason: String) -> bool {
        let in_flight = matches!(
            (&*self, transition),
            (LiveViewState::Starting, Transition::Start) | (LiveViewState::Stopping, Transition::Stop)
        );
        if in_flight {
            *self = LiveViewState::Failed { during: transition, reason };
        }
        in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.next_transition().is_none()
    }

    pub fn is_running(&self) -> bool {
        matches!(self, LiveViewState::Running)
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            LiveViewState::Stopped => "Start Live View",
            LiveViewState::Starting => "Starting Live View...",
            LiveViewState::Running => "Stop Live View",
            LiveViewState::Stopping => "Stopping Live View...",
            LiveViewState::Failed { during: Transition::Start, .. } => "Start Live View",
            LiveViewState::Failed { during: Transition::Stop, .. } => "Stop Live View",
        }
    }
}
