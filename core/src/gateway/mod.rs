use crate::config::Config;
use crate::protocol::{Command, CommandKind, Reply};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod local;
pub mod recording;
pub mod stream;

pub use local::{BackendSnapshot, LocalGateway};
pub use recording::RecordingGateway;
pub use stream::{serve, StreamGateway};

/// Backend surface that every gateway implementation must satisfy
#[async_trait]
pub trait CommandGateway: Send + Sync {
    /// Execute a command and wait for the backend's reply
    async fn invoke(&self, command: Command) -> Result<Reply, GatewayError>;

    /// Get gateway information
    fn info(&self) -> GatewayInfo;
}

/// Information about a gateway
#[derive(Debug, Clone)]
pub struct GatewayInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

/// Errors that can occur while invoking a backend command
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("{command} rejected: {reason}")]
    Rejected { command: CommandKind, reason: String },

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Unsupported protocol version {0}")]
    ProtocolMismatch(u32),
}

impl GatewayError {
    /// Reason text without the command prefix, for inline field errors
    pub fn reason(&self) -> String {
        match self {
            GatewayError::Rejected { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Factory for creating the configured gateway
pub struct GatewayFactory;

impl GatewayFactory {
    /// In-process backend using the configured latency and threshold bounds
    pub fn create_local(config: &Config) -> Arc<dyn CommandGateway> {
        let gateway = LocalGateway::new()
            .with_delay(Duration::from_millis(config.gateway.latency_ms))
            .with_bounds(config.thresholds.bounds());
        Arc::new(gateway)
    }

    /// Spawn `program` and talk to it over its stdio
    pub fn create_process(
        config: &Config,
        program: &str,
        args: &[String],
    ) -> Result<Arc<dyn CommandGateway>, GatewayError> {
        let gateway = StreamGateway::spawn(program, args)?
            .with_timeout(Duration::from_millis(config.gateway.request_timeout_ms));
        Ok(Arc::new(gateway))
    }

    /// Process backend when one is configured, in-process backend otherwise
    pub fn from_config(config: &Config) -> Result<Arc<dyn CommandGateway>, GatewayError> {
        match &config.gateway.backend {
            Some(program) => Self::create_process(config, program, &config.gateway.backend_args),
            None => Ok(Self::create_local(config)),
        }
    }
}
