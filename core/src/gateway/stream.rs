use super::{CommandGateway, GatewayError, GatewayInfo};
use crate::protocol::{Command, Reply, ReplyEnvelope, RequestEnvelope, RequestId, PROTOCOL_VERSION};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command as ProcessCommand};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

type Waiter = oneshot::Sender<Result<Reply, GatewayError>>;
type PendingTable = Arc<Mutex<HashMap<RequestId, Waiter>>>;

/// Gateway speaking the JSON-lines protocol over a byte stream pair
pub struct StreamGateway {
    info: GatewayInfo,
    writer: tokio::sync::Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    pending: PendingTable,
    next_id: AtomicU64,
    timeout: Duration,
    reader_task: JoinHandle<()>,
    child: Mutex<Option<Child>>,
}

impl StreamGateway {
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let pending: PendingTable = Arc::new(Mutex::new(HashMap::new()));
        let reader_task = tokio::spawn(read_replies(reader, pending.clone()));

        Self {
            info: GatewayInfo {
                name: "Stream Gateway".to_string(),
                description: "JSON-lines backend connection".to_string(),
                version: PROTOCOL_VERSION.to_string(),
            },
            writer: tokio::sync::Mutex::new(Box::new(writer)),
            pending,
            next_id: AtomicU64::new(1),
            timeout: Duration::from_secs(5),
            reader_task,
            child: Mutex::new(None),
        }
    }

    /// Spawn a backend process and connect to its stdin/stdout
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, GatewayError> {
        let mut child = ProcessCommand::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GatewayError::Unavailable(format!("failed to spawn {}: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GatewayError::Unavailable("backend stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::Unavailable("backend stdout not captured".to_string()))?;

        let mut gateway = Self::new(stdout, stdin);
        gateway.info.name = format!("Process Gateway ({})", program);
        gateway.child = Mutex::new(Some(child));
        Ok(gateway)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn forget(&self, id: RequestId) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.remove(&id);
        }
    }

    async fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

impl Drop for StreamGateway {
    fn drop(&mut self) {
        self.reader_task.abort();
        if let Ok(mut child) = self.child.lock() {
            if let Some(child) = child.as_mut() {
                let _ = child.start_kill();
            }
        }
    }
}

#[async_trait]
impl CommandGateway for StreamGateway {
    async fn invoke(&self, command: Command) -> Result<Reply, GatewayError> {
        let id = RequestId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| GatewayError::Transport("pending table poisoned".to_string()))?
            .insert(id, tx);

        let line = serde_json::to_string(&RequestEnvelope::new(id, command))
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if let Err(e) = self.write_line(&line).await {
            self.forget(id);
            return Err(GatewayError::Transport(e.to_string()));
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(GatewayError::Unavailable(
                "backend closed the connection".to_string(),
            )),
            Err(_) => {
                self.forget(id);
                Err(GatewayError::Transport(format!(
                    "request {} timed out after {}ms",
                    id,
                    self.timeout.as_millis()
                )))
            }
        }
    }

    fn info(&self) -> GatewayInfo {
        self.info.clone()
    }
}

/// Route each reply line to the waiter registered under its id
async fn read_replies<R>(reader: R, pending: PendingTable)
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read from backend: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let envelope: ReplyEnvelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Skipping malformed reply line: {}", e);
                continue;
            }
        };

        let outcome = if envelope.version == PROTOCOL_VERSION {
            envelope.outcome
        } else {
            Err(GatewayError::ProtocolMismatch(envelope.version))
        };

        let waiter = pending.lock().ok().and_then(|mut p| p.remove(&envelope.id));
        match waiter {
            Some(waiter) => {
                let _ = waiter.send(outcome);
            }
            None => debug!("Reply {} has no waiter", envelope.id),
        }
    }

    // Dropping the senders wakes every waiter with a closed-channel error
    if let Ok(mut pending) = pending.lock() {
        pending.clear();
    }
}

/// Serve `gateway` over a JSON-lines stream until the reader reaches EOF.
///
/// Requests are handled concurrently, so replies may be written in a
/// different order than the requests arrived.
pub async fn serve<R, W>(gateway: Arc<dyn CommandGateway>, reader: R, writer: W) -> io::Result<()>
where
    R: AsyncRead + Send + Unpin + 'static,
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<ReplyEnvelope>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(envelope) = rx.recv().await {
            let mut line = serde_json::to_string(&envelope)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<(), io::Error>(())
    });

    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let request: RequestEnvelope = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!("Skipping malformed request line: {}", e);
                continue;
            }
        };

        if request.version != PROTOCOL_VERSION {
            let _ = tx.send(ReplyEnvelope::new(
                request.id,
                Err(GatewayError::ProtocolMismatch(request.version)),
            ));
            continue;
        }

        debug!("Serving request {} ({})", request.id, request.command.kind());
        let gateway = gateway.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let outcome = gateway.invoke(request.command).await;
            let _ = tx.send(ReplyEnvelope::new(request.id, outcome));
        });
    }

    // The writer finishes once every in-flight handler has replied
    drop(tx);
    writer_task
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
}
