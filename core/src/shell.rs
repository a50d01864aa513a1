//! The view model behind the control panel.
//!
//! `ViewShell` owns every piece of local UI state and is the only place that
//! talks to the gateway. Each command runs on its own tokio task and reports
//! back through the event bus, so the caller never waits on the backend.

use crate::config::ThresholdConfig;
use crate::events::{AppEvent, EventSender};
use crate::gateway::{CommandGateway, GatewayError, GatewayInfo};
use crate::live_view::{LiveViewState, Transition};
use crate::protocol::{Command, CommandKind, Reply, RequestId};
use crate::threshold::{ThresholdField, ThresholdKind};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient message shown in the status line
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub raised_at: Instant,
}

pub struct ViewShell {
    gateway: Arc<dyn CommandGateway>,
    event_sender: EventSender,
    next_id: u64,
    in_flight: HashMap<RequestId, CommandKind>,

    name: String,
    greeting: String,
    greeting_id: Option<RequestId>,

    live_view: LiveViewState,

    thresholds: ThresholdConfig,
    min: ThresholdField,
    max: ThresholdField,
    /// Second half of a threshold reset, sent once `.0` is acknowledged
    reset_followup: Option<(RequestId, ThresholdKind, i32)>,

    notices: VecDeque<Notice>,
    notice_ttl: Duration,
}

impl ViewShell {
    pub fn new(gateway: Arc<dyn CommandGateway>, event_sender: EventSender) -> Self {
        let thresholds = ThresholdConfig::default();
        Self {
            gateway,
            event_sender,
            next_id: 1,
            in_flight: HashMap::new(),
            name: String::new(),
            greeting: String::new(),
            greeting_id: None,
            live_view: LiveViewState::default(),
            min: ThresholdField::new(ThresholdKind::Min, thresholds.default_min),
            max: ThresholdField::new(ThresholdKind::Max, thresholds.default_max),
            reset_followup: None,
            thresholds,
            notices: VecDeque::new(),
            notice_ttl: Duration::from_secs(4),
        }
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdConfig) -> Self {
        self.min = ThresholdField::new(ThresholdKind::Min, thresholds.default_min);
        self.max = ThresholdField::new(ThresholdKind::Max, thresholds.default_max);
        self.thresholds = thresholds;
        self
    }

    pub fn with_notice_ttl(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn gateway_info(&self) -> GatewayInfo {
        self.gateway.info()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn live_view(&self) -> &LiveViewState {
        &self.live_view
    }

    pub fn min_threshold(&self) -> &ThresholdField {
        &self.min
    }

    pub fn max_threshold(&self) -> &ThresholdField {
        &self.max
    }

    pub fn threshold_config(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Notices, newest first
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().rev()
    }

    /// Replace the name input text
    pub fn edit_name(&mut self, name: String) {
        self.name = name;
    }

    /// Send the current name to the backend's greet command
    pub fn greet(&mut self) -> RequestId {
        let name = self.name.clone();
        self.dispatch(Command::Greet { name })
    }

    /// Request the opposite live view state. Ignored while a change is in flight.
    pub fn toggle_live_view(&mut self) -> Option<RequestId> {
        let Some(transition) = self.live_view.next_transition() else {
            debug!("Live view toggle ignored while {:?}", self.live_view);
            return None;
        };
        self.live_view.begin(transition);
        Some(self.dispatch(transition.command()))
    }

    pub fn edit_min_threshold(&mut self, raw: &str, now: Instant) -> Option<RequestId> {
        self.edit_threshold(ThresholdKind::Min, raw, now)
    }

    pub fn edit_max_threshold(&mut self, raw: &str, now: Instant) -> Option<RequestId> {
        self.edit_threshold(ThresholdKind::Max, raw, now)
    }

    fn edit_threshold(&mut self, kind: ThresholdKind, raw: &str, now: Instant) -> Option<RequestId> {
        if matches!(self.reset_followup, Some((_, pending, _)) if pending == kind) {
            debug!("{} threshold edited, dropping queued reset", kind);
            self.reset_followup = None;
        }

        let bounds = self.thresholds.bounds();
        let (field, other) = match kind {
            ThresholdKind::Min => (&mut self.min, self.max.effective()),
            ThresholdKind::Max => (&mut self.max, self.min.effective()),
        };

        let value = match field.edit(raw, bounds, other) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                debug!("{} threshold edit not forwarded: {}", kind, e);
                return None;
            }
        };

        if value == field.last_forwarded() {
            field.clear_pending();
            return None;
        }

        let debounce = self.thresholds.debounce();
        if debounce.is_zero() {
            self.send_threshold(kind, value)
        } else {
            field.schedule(value, now + debounce);
            None
        }
    }

    fn send_threshold(&mut self, kind: ThresholdKind, value: i32) -> Option<RequestId> {
        let id = self.dispatch(kind.command(value));
        self.field_mut(kind).mark_sent(id, value);
        Some(id)
    }

    fn field(&self, kind: ThresholdKind) -> &ThresholdField {
        match kind {
            ThresholdKind::Min => &self.min,
            ThresholdKind::Max => &self.max,
        }
    }

    fn field_mut(&mut self, kind: ThresholdKind) -> &mut ThresholdField {
        match kind {
            ThresholdKind::Min => &mut self.min,
            ThresholdKind::Max => &mut self.max,
        }
    }

    /// Send debounced threshold values now, regardless of their deadline
    pub fn flush_thresholds(&mut self) -> Vec<RequestId> {
        let mut sent = Vec::new();
        for kind in [ThresholdKind::Min, ThresholdKind::Max] {
            if let Some(value) = self.field_mut(kind).take_pending() {
                sent.extend(self.send_threshold(kind, value));
            }
        }
        sent
    }

    /// Periodic housekeeping: fire due debounced edits and expire notices
    pub fn tick(&mut self, now: Instant) -> Vec<RequestId> {
        let mut sent = Vec::new();
        for kind in [ThresholdKind::Min, ThresholdKind::Max] {
            if let Some(value) = self.field_mut(kind).take_due(now) {
                sent.extend(self.send_threshold(kind, value));
            }
        }
        self.prune_notices(now);
        sent
    }

    pub fn prune_notices(&mut self, now: Instant) {
        let ttl = self.notice_ttl;
        self.notices
            .retain(|n| now.saturating_duration_since(n.raised_at) < ttl);
    }

    /// Apply an event coming back from the bus
    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::CommandIssued { id, command } => {
                debug!("Command {} issued: {:?}", id, command);
            }
            AppEvent::CommandSucceeded { id, kind, reply } => self.on_succeeded(id, kind, reply),
            AppEvent::CommandFailed { id, kind, error } => self.on_failed(id, kind, error),
            AppEvent::Quit => {}
        }
    }

    fn on_succeeded(&mut self, id: RequestId, kind: CommandKind, reply: Reply) {
        self.in_flight.remove(&id);
        debug!("Command {} ({}) succeeded", id, kind);

        match (kind, reply) {
            (CommandKind::Greet, Reply::Greeting(text)) => {
                if self.greeting_id.map_or(true, |shown| id > shown) {
                    self.greeting = text;
                    self.greeting_id = Some(id);
                } else {
                    debug!("Dropping stale greeting from {}", id);
                }
            }
            (CommandKind::StartLiveView, _) => {
                if !self.live_view.acknowledge(Transition::Start) {
                    warn!("Unexpected start acknowledgment {}", id);
                }
            }
            (CommandKind::StopLiveView, _) => {
                if self.live_view.acknowledge(Transition::Stop) {
                    if self.thresholds.reset_on_stop {
                        self.reset_thresholds();
                    }
                } else {
                    warn!("Unexpected stop acknowledgment {}", id);
                }
            }
            (CommandKind::SetMinThreshold, _) => {
                self.min.acknowledge(id);
                self.send_reset_followup(id);
            }
            (CommandKind::SetMaxThreshold, _) => {
                self.max.acknowledge(id);
                self.send_reset_followup(id);
            }
            (CommandKind::Greet, other) => {
                warn!("Greet {} answered with {:?}", id, other);
                self.raise(NoticeLevel::Error, "greet returned no greeting".to_string());
            }
        }
    }

    fn on_failed(&mut self, id: RequestId, kind: CommandKind, error: GatewayError) {
        self.in_flight.remove(&id);
        warn!("Command {} ({}) failed: {}", id, kind, error);

        match kind {
            CommandKind::Greet => {}
            CommandKind::StartLiveView => {
                self.live_view.fail(Transition::Start, error.reason());
            }
            CommandKind::StopLiveView => {
                self.live_view.fail(Transition::Stop, error.reason());
            }
            CommandKind::SetMinThreshold => {
                self.min.reject(id, error.reason());
            }
            CommandKind::SetMaxThreshold => {
                self.max.reject(id, error.reason());
            }
        }
        if let Some((_, kind, value)) = self.reset_followup.filter(|(first, _, _)| *first == id) {
            debug!("Reset step {} failed, not sending {} = {}", id, kind, value);
            self.reset_followup = None;
        }
        self.raise(NoticeLevel::Error, error.to_string());
    }

    /// Put both thresholds back to their defaults after the live view stops
    fn reset_thresholds(&mut self) {
        self.min.reset();
        self.max.reset();
        self.reset_followup = None;

        let (default_min, default_max) = (self.thresholds.default_min, self.thresholds.default_max);
        // Move whichever bound keeps min <= max on the backend after each step
        let order = if default_max < self.min.last_forwarded() {
            [(ThresholdKind::Min, default_min), (ThresholdKind::Max, default_max)]
        } else {
            [(ThresholdKind::Max, default_max), (ThresholdKind::Min, default_min)]
        };
        let changed: Vec<_> = order
            .into_iter()
            .filter(|(kind, default)| self.field(*kind).last_forwarded() != *default)
            .collect();

        match changed.as_slice() {
            [] => {}
            [(kind, value)] => {
                self.send_threshold(*kind, *value);
            }
            [(kind, value), (next_kind, next_value), ..] => {
                if let Some(first) = self.send_threshold(*kind, *value) {
                    self.reset_followup = Some((first, *next_kind, *next_value));
                }
            }
        }
        self.raise(NoticeLevel::Info, "Thresholds reset to defaults".to_string());
    }

    fn send_reset_followup(&mut self, acknowledged: RequestId) {
        match self.reset_followup {
            Some((first, kind, value)) if first == acknowledged => {
                self.reset_followup = None;
                self.send_threshold(kind, value);
            }
            _ => {}
        }
    }

    fn raise(&mut self, level: NoticeLevel, text: String) {
        self.notices.push_back(Notice {
            level,
            text,
            raised_at: Instant::now(),
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    fn dispatch(&mut self, command: Command) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        let kind = command.kind();
        self.in_flight.insert(id, kind);

        if let Err(e) = self.event_sender.send(AppEvent::CommandIssued {
            id,
            command: command.clone(),
        }) {
            warn!("Failed to post CommandIssued for {}: {}", id, e);
        }

        // Spawn the call so rendering continues while the backend works
        let gateway = self.gateway.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let outcome = gateway.invoke(command).await;
            let _ = sender.send_outcome(id, kind, outcome);
        });

        id
    }
}

