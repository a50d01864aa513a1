use crate::gateway::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version stamped on every envelope that crosses a process boundary
pub const PROTOCOL_VERSION: u32 = 1;

/// Identifier assigned to each dispatched command, increasing in dispatch order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Commands understood by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "args", rename_all = "snake_case")]
pub enum Command {
    Greet {
        name: String,
    },
    StartLiveView,
    StopLiveView,
    SetMinThreshold {
        #[serde(rename = "newMinThreshold")]
        new_min_threshold: i32,
    },
    SetMaxThreshold {
        #[serde(rename = "newMaxThreshold")]
        new_max_threshold: i32,
    },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Greet { .. } => CommandKind::Greet,
            Command::StartLiveView => CommandKind::StartLiveView,
            Command::StopLiveView => CommandKind::StopLiveView,
            Command::SetMinThreshold { .. } => CommandKind::SetMinThreshold,
            Command::SetMaxThreshold { .. } => CommandKind::SetMaxThreshold,
        }
    }
}

/// Payload-free discriminant of a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Greet,
    StartLiveView,
    StopLiveView,
    SetMinThreshold,
    SetMaxThreshold,
}

impl CommandKind {
    /// Name of the command on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Greet => "greet",
            CommandKind::StartLiveView => "start_live_view",
            CommandKind::StopLiveView => "stop_live_view",
            CommandKind::SetMinThreshold => "set_min_threshold",
            CommandKind::SetMaxThreshold => "set_max_threshold",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Successful backend reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Reply {
    Greeting(String),
    Ack,
}

/// A command as written to a backend stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub version: u32,
    pub id: RequestId,
    pub command: Command,
}

impl RequestEnvelope {
    pub fn new(id: RequestId, command: Command) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            id,
            command,
        }
    }
}

/// The outcome of a command as read back from a backend stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyEnvelope {
    pub version: u32,
    pub id: RequestId,
    pub outcome: Result<Reply, GatewayError>,
}

impl ReplyEnvelope {
    pub fn new(id: RequestId, outcome: Result<Reply, GatewayError>) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            id,
            outcome,
        }
    }
}
