use super::{CommandGateway, GatewayError, GatewayInfo};
use crate::protocol::{Command, CommandKind, Reply};
use crate::threshold::ThresholdBounds;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use tracing::debug;

/// Backend state kept by [`LocalGateway`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSnapshot {
    pub live_view_running: bool,
    pub min_threshold: i32,
    pub max_threshold: i32,
}

/// In-process backend that answers every command with a simulated delay
pub struct LocalGateway {
    info: GatewayInfo,
    delay: Duration,
    bounds: ThresholdBounds,
    failing: HashSet<CommandKind>,
    state: Mutex<BackendSnapshot>,
}

impl LocalGateway {
    pub fn new() -> Self {
        let bounds = ThresholdBounds::default();
        Self {
            info: GatewayInfo {
                name: "Local Gateway".to_string(),
                description: "In-process live view backend".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            delay: Duration::from_millis(120),
            bounds,
            failing: HashSet::new(),
            state: Mutex::new(BackendSnapshot {
                live_view_running: false,
                min_threshold: bounds.lower,
                max_threshold: bounds.upper,
            }),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_bounds(mut self, bounds: ThresholdBounds) -> Self {
        self.bounds = bounds;
        self.state = Mutex::new(BackendSnapshot {
            live_view_running: false,
            min_threshold: bounds.lower,
            max_threshold: bounds.upper,
        });
        self
    }

    /// Make every invocation of `kind` fail with a rejection
    pub fn with_failure(mut self, kind: CommandKind) -> Self {
        self.failing.insert(kind);
        self
    }

    pub fn snapshot(&self) -> Result<BackendSnapshot, GatewayError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| GatewayError::Unavailable("backend state poisoned".to_string()))
    }

    fn apply(&self, command: Command) -> Result<Reply, GatewayError> {
        let kind = command.kind();
        if self.failing.contains(&kind) {
            return Err(rejected(kind, "simulated failure"));
        }

        let mut state = self
            .state
            .lock()
            .map_err(|_| GatewayError::Unavailable("backend state poisoned".to_string()))?;

        match command {
            Command::Greet { name } => Ok(Reply::Greeting(format!(
                "Hello, {}! You've been greeted from Rust!",
                name
            ))),
            Command::StartLiveView => {
                if state.live_view_running {
                    return Err(rejected(kind, "live view is already running"));
                }
                state.live_view_running = true;
                Ok(Reply::Ack)
            }
            Command::StopLiveView => {
                if !state.live_view_running {
                    return Err(rejected(kind, "live view is not running"));
                }
                state.live_view_running = false;
                Ok(Reply::Ack)
            }
            Command::SetMinThreshold { new_min_threshold } => {
                self.check_bounds(kind, new_min_threshold)?;
                if new_min_threshold > state.max_threshold {
                    return Err(rejected(
                        kind,
                        &format!(
                            "minimum {} exceeds maximum {}",
                            new_min_threshold, state.max_threshold
                        ),
                    ));
                }
                state.min_threshold = new_min_threshold;
                Ok(Reply::Ack)
            }
            Command::SetMaxThreshold { new_max_threshold } => {
                self.check_bounds(kind, new_max_threshold)?;
                if new_max_threshold < state.min_threshold {
                    return Err(rejected(
                        kind,
                        &format!(
                            "maximum {} is below minimum {}",
                            new_max_threshold, state.min_threshold
                        ),
                    ));
                }
                state.max_threshold = new_max_threshold;
                Ok(Reply::Ack)
            }
        }
    }

    fn check_bounds(&self, kind: CommandKind, value: i32) -> Result<(), GatewayError> {
        if self.bounds.contains(value) {
            Ok(())
        } else {
            Err(rejected(
                kind,
                &format!(
                    "{} is outside {}..={}",
                    value, self.bounds.lower, self.bounds.upper
                ),
            ))
        }
    }
}

impl Default for LocalGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandGateway for LocalGateway {
    async fn invoke(&self, command: Command) -> Result<Reply, GatewayError> {
        debug!("Local gateway received {}", command.kind());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.apply(command)
    }

    fn info(&self) -> GatewayInfo {
        self.info.clone()
    }
}

fn rejected(command: CommandKind, reason: &str) -> GatewayError {
    GatewayError::Rejected {
        command,
        reason: reason.to_string(),
    }
}
