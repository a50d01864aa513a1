use super::{CommandGateway, GatewayError, GatewayInfo};
use crate::protocol::{Command, CommandKind, Reply};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Gateway decorator that remembers every command it forwards
pub struct RecordingGateway {
    inner: Arc<dyn CommandGateway>,
    calls: Mutex<Vec<Command>>,
}

impl RecordingGateway {
    pub fn new(inner: Arc<dyn CommandGateway>) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Commands received so far, in arrival order
    pub fn calls(&self) -> Vec<Command> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: CommandKind) -> usize {
        self.calls().iter().filter(|c| c.kind() == kind).count()
    }
}

#[async_trait]
impl CommandGateway for RecordingGateway {
    async fn invoke(&self, command: Command) -> Result<Reply, GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.clone());
        }
        self.inner.invoke(command).await
    }

    fn info(&self) -> GatewayInfo {
        self.inner.info()
    }
}
