use super::*;
use crate::config::ThresholdConfig;
use crate::events::AppEvent;
use crate::live_view::{LiveViewState, Transition};
use crate::protocol::{Command, CommandKind, Reply, RequestId};
use crate::shell::NoticeLevel;
use crate::gateway::{GatewayError, GatewayInfo};
use crate::threshold::{ThresholdBounds, ThresholdError};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Applies commands in arrival order but holds each max threshold reply
/// for `100 - value` ms, so smaller values are acknowledged last
struct LateReplies {
    inner: LocalGateway,
}

#[async_trait]
impl CommandGateway for LateReplies {
    async fn invoke(&self, command: Command) -> Result<Reply, GatewayError> {
        let hold = match &command {
            Command::SetMaxThreshold { new_max_threshold } => (100 - *new_max_threshold).max(0) as u64,
            _ => 0,
        };
        let outcome = self.inner.invoke(command).await;
        tokio::time::sleep(Duration::from_millis(hold)).await;
        outcome
    }

    fn info(&self) -> GatewayInfo {
        self.inner.info()
    }
}

#[tokio::test]
async fn test_greet_sends_name_verbatim() {
    for name in ["Ada", "", "  spaced out  ", "Zoë"] {
        let recorder = recording(instant_backend());
        let (mut shell, mut receiver) = setup_shell(recorder.clone());

        shell.edit_name(name.to_string());
        shell.greet();
        settle(&mut shell, &mut receiver).await;

        assert_eq!(recorder.calls(), vec![Command::Greet { name: name.to_string() }]);
        assert_eq!(
            shell.greeting(),
            format!("Hello, {}! You've been greeted from Rust!", name)
        );
    }
}

#[tokio::test]
async fn test_greet_failure_surfaces_notice() {
    let recorder = recording(instant_backend().with_failure(CommandKind::Greet));
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_name("Ada".to_string());
    shell.greet();
    settle(&mut shell, &mut receiver).await;

    assert_eq!(shell.greeting(), "");
    let notice = shell.notices().next().expect("error notice");
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.text.contains("greet rejected"));
}

#[tokio::test]
async fn test_stale_greeting_is_dropped() {
    let (mut shell, _receiver) = setup_shell(recording(instant_backend()));

    shell.handle_event(AppEvent::CommandSucceeded {
        id: RequestId(2),
        kind: CommandKind::Greet,
        reply: Reply::Greeting("newer".to_string()),
    });
    shell.handle_event(AppEvent::CommandSucceeded {
        id: RequestId(1),
        kind: CommandKind::Greet,
        reply: Reply::Greeting("older".to_string()),
    });

    assert_eq!(shell.greeting(), "newer");
}

#[tokio::test]
async fn test_toggle_from_stopped_starts_once() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    assert!(shell.toggle_live_view().is_some());
    assert_eq!(shell.live_view().button_label(), "Starting Live View...");

    settle(&mut shell, &mut receiver).await;
    assert_eq!(recorder.calls(), vec![Command::StartLiveView]);
    assert_eq!(shell.live_view(), &LiveViewState::Running);
    assert_eq!(shell.live_view().button_label(), "Stop Live View");
}

#[tokio::test]
async fn test_toggle_failure_does_not_flip_label() {
    let recorder = recording(instant_backend().with_failure(CommandKind::StartLiveView));
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.count(CommandKind::StartLiveView), 1);
    assert!(matches!(
        shell.live_view(),
        LiveViewState::Failed { during: Transition::Start, .. }
    ));
    assert_eq!(shell.live_view().button_label(), "Start Live View");
    assert!(shell.notices().any(|n| n.level == NoticeLevel::Error));

    // Clicking again retries the start
    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;
    assert_eq!(recorder.count(CommandKind::StartLiveView), 2);
}

#[tokio::test]
async fn test_toggle_ignored_while_in_flight() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    assert!(shell.toggle_live_view().is_some());
    assert!(shell.toggle_live_view().is_none());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.count(CommandKind::StartLiveView), 1);
    assert_eq!(recorder.count(CommandKind::StopLiveView), 0);
}

#[tokio::test]
async fn test_two_clicks_return_to_start() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.toggle_live_view();
    let mut events = settle(&mut shell, &mut receiver).await;
    shell.toggle_live_view();
    events.extend(settle(&mut shell, &mut receiver).await);

    assert_eq!(
        issued_commands(&events),
        vec![Command::StartLiveView, Command::StopLiveView]
    );
    assert_eq!(recorder.calls(), vec![Command::StartLiveView, Command::StopLiveView]);
    assert_eq!(shell.live_view().button_label(), "Start Live View");
}

#[tokio::test]
async fn test_min_threshold_forwards_parsed_value() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    assert!(shell.edit_min_threshold("42", Instant::now()).is_some());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.calls(), vec![Command::SetMinThreshold { new_min_threshold: 42 }]);
    assert_eq!(shell.min_threshold().confirmed(), 42);
    assert!(shell.min_threshold().error().is_none());
}

#[tokio::test]
async fn test_non_numeric_max_is_not_forwarded() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    assert!(shell.edit_max_threshold("abc", Instant::now()).is_none());
    settle(&mut shell, &mut receiver).await;

    assert!(recorder.calls().is_empty());
    assert_eq!(shell.max_threshold().text(), "abc");
    assert_eq!(
        shell.max_threshold().error(),
        Some(&ThresholdError::NotANumber("abc".to_string()))
    );
}

#[tokio::test]
async fn test_blank_threshold_clears_error_without_call() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_min_threshold("x", Instant::now());
    assert!(shell.min_threshold().error().is_some());
    assert!(shell.edit_min_threshold("", Instant::now()).is_none());
    settle(&mut shell, &mut receiver).await;

    assert!(shell.min_threshold().error().is_none());
    assert!(recorder.calls().is_empty());
}

#[tokio::test]
async fn test_min_above_max_rejected_locally() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_max_threshold("30", Instant::now());
    assert!(shell.edit_min_threshold("40", Instant::now()).is_none());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.calls(), vec![Command::SetMaxThreshold { new_max_threshold: 30 }]);
    assert_eq!(
        shell.min_threshold().error(),
        Some(&ThresholdError::MinAboveMax { min: 40, max: 30 })
    );
}

#[tokio::test]
async fn test_unchanged_threshold_not_resent() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_min_threshold("42", Instant::now());
    settle(&mut shell, &mut receiver).await;
    assert!(shell.edit_min_threshold(" 42 ", Instant::now()).is_none());
    // The configured default is already what the backend holds
    assert!(shell.edit_max_threshold("100", Instant::now()).is_none());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.calls().len(), 1);
}

#[tokio::test]
async fn test_debounce_collapses_edits() {
    let recorder = recording(instant_backend());
    let (sender, mut receiver) = setup_event_bus();
    let mut shell = ViewShell::new(recorder.clone(), sender).with_thresholds(ThresholdConfig {
        debounce_ms: 200,
        ..ThresholdConfig::default()
    });

    let t0 = Instant::now();
    assert!(shell.edit_min_threshold("4", t0).is_none());
    assert!(shell.edit_min_threshold("42", t0 + Duration::from_millis(50)).is_none());
    assert_eq!(shell.min_threshold().pending_value(), Some(42));

    assert!(shell.tick(t0 + Duration::from_millis(200)).is_empty());
    assert_eq!(shell.tick(t0 + Duration::from_millis(250)).len(), 1);
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.calls(), vec![Command::SetMinThreshold { new_min_threshold: 42 }]);
}

#[tokio::test]
async fn test_flush_sends_pending_immediately() {
    let recorder = recording(instant_backend());
    let (sender, mut receiver) = setup_event_bus();
    let mut shell = ViewShell::new(recorder.clone(), sender).with_thresholds(ThresholdConfig {
        debounce_ms: 10_000,
        ..ThresholdConfig::default()
    });

    shell.edit_max_threshold("75", Instant::now());
    assert_eq!(shell.flush_thresholds().len(), 1);
    assert!(shell.flush_thresholds().is_empty());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.calls(), vec![Command::SetMaxThreshold { new_max_threshold: 75 }]);
    assert_eq!(shell.max_threshold().confirmed(), 75);
}

#[tokio::test]
async fn test_backend_rejection_marks_field() {
    let recorder = recording(instant_backend().with_failure(CommandKind::SetMinThreshold));
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_min_threshold("10", Instant::now());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(shell.min_threshold().confirmed(), 0);
    assert_eq!(
        shell.min_threshold().error(),
        Some(&ThresholdError::Rejected("simulated failure".to_string()))
    );
    assert!(shell.notices().any(|n| n.level == NoticeLevel::Error));
}

#[tokio::test]
async fn test_stop_resets_changed_thresholds() {
    let backend = Arc::new(instant_backend());
    let recorder = Arc::new(RecordingGateway::new(backend.clone()));
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;
    shell.edit_min_threshold("20", Instant::now());
    shell.edit_max_threshold("80", Instant::now());
    settle(&mut shell, &mut receiver).await;

    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;

    let calls = recorder.calls();
    assert_eq!(
        calls[calls.len() - 3..],
        [
            Command::StopLiveView,
            Command::SetMaxThreshold { new_max_threshold: 100 },
            Command::SetMinThreshold { new_min_threshold: 0 },
        ]
    );
    assert_eq!(shell.min_threshold().text(), "");
    assert_eq!(shell.max_threshold().confirmed(), 100);

    let snapshot = backend.snapshot().unwrap();
    assert!(!snapshot.live_view_running);
    assert_eq!((snapshot.min_threshold, snapshot.max_threshold), (0, 100));
    assert!(shell.notices().any(|n| n.level == NoticeLevel::Info));
}

#[tokio::test]
async fn test_earlier_ack_survives_later_rejection() {
    // The backend accepts 4 but refuses 42
    let backend = Arc::new(instant_backend().with_bounds(ThresholdBounds { lower: 0, upper: 40 }));
    let (mut shell, mut receiver) = setup_shell(backend.clone());

    shell.edit_min_threshold("4", Instant::now());
    shell.edit_min_threshold("42", Instant::now());
    settle(&mut shell, &mut receiver).await;

    assert_eq!(backend.snapshot().unwrap().min_threshold, 4);
    assert_eq!(shell.min_threshold().confirmed(), 4);
    assert_eq!(shell.min_threshold().last_forwarded(), 4);
    assert!(matches!(shell.min_threshold().error(), Some(ThresholdError::Rejected(_))));

    // Going back to the original value is a real change for the backend
    assert!(shell.edit_min_threshold("0", Instant::now()).is_some());
    settle(&mut shell, &mut receiver).await;
    assert_eq!(backend.snapshot().unwrap().min_threshold, 0);
    assert_eq!(shell.min_threshold().confirmed(), 0);
}

#[tokio::test]
async fn test_out_of_order_acks_keep_newest_value() {
    let backend = Arc::new(LateReplies { inner: instant_backend() });
    let (mut shell, mut receiver) = setup_shell(backend.clone());

    shell.edit_max_threshold("9", Instant::now());
    shell.edit_max_threshold("90", Instant::now());
    let events = settle(&mut shell, &mut receiver).await;

    let acked: Vec<RequestId> = events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CommandSucceeded { id, .. } => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(acked, vec![RequestId(2), RequestId(1)]);

    assert_eq!(backend.inner.snapshot().unwrap().max_threshold, 90);
    assert_eq!(shell.max_threshold().confirmed(), 90);
    assert_eq!(shell.max_threshold().last_forwarded(), 90);
    assert!(shell.edit_max_threshold("90", Instant::now()).is_none());
}

#[tokio::test]
async fn test_stop_resets_lowered_defaults_min_first() {
    let backend = Arc::new(instant_backend());
    let recorder = Arc::new(RecordingGateway::new(backend.clone()));
    let (sender, mut receiver) = setup_event_bus();
    let mut shell = ViewShell::new(recorder.clone(), sender).with_thresholds(ThresholdConfig {
        default_min: 10,
        default_max: 20,
        ..ThresholdConfig::default()
    });

    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;
    shell.edit_max_threshold("60", Instant::now());
    shell.edit_min_threshold("50", Instant::now());
    settle(&mut shell, &mut receiver).await;
    assert_eq!(backend.snapshot().unwrap().min_threshold, 50);

    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;

    let calls = recorder.calls();
    assert_eq!(
        calls[calls.len() - 3..],
        [
            Command::StopLiveView,
            Command::SetMinThreshold { new_min_threshold: 10 },
            Command::SetMaxThreshold { new_max_threshold: 20 },
        ]
    );
    let snapshot = backend.snapshot().unwrap();
    assert_eq!((snapshot.min_threshold, snapshot.max_threshold), (10, 20));
    assert_eq!(shell.max_threshold().error(), None);
    assert_eq!((shell.min_threshold().confirmed(), shell.max_threshold().confirmed()), (10, 20));
}

/// Refuses one specific max threshold and forwards everything else
struct RefuseMax {
    inner: Arc<LocalGateway>,
    refused: i32,
}

#[async_trait]
impl CommandGateway for RefuseMax {
    async fn invoke(&self, command: Command) -> Result<Reply, GatewayError> {
        match command {
            Command::SetMaxThreshold { new_max_threshold } if new_max_threshold == self.refused => {
                Err(GatewayError::Rejected {
                    command: CommandKind::SetMaxThreshold,
                    reason: "refused".to_string(),
                })
            }
            other => self.inner.invoke(other).await,
        }
    }

    fn info(&self) -> GatewayInfo {
        self.inner.info()
    }
}

#[tokio::test]
async fn test_reset_waits_for_first_step() {
    let backend = Arc::new(instant_backend());
    let refusing = Arc::new(RefuseMax { inner: backend.clone(), refused: 100 });
    let recorder = Arc::new(RecordingGateway::new(refusing));
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_max_threshold("80", Instant::now());
    shell.edit_min_threshold("20", Instant::now());
    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;

    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;

    // Max goes first and is refused, so the queued min step is never sent
    assert_eq!(recorder.count(CommandKind::SetMaxThreshold), 2);
    assert_eq!(recorder.count(CommandKind::SetMinThreshold), 1);
    let snapshot = backend.snapshot().unwrap();
    assert_eq!((snapshot.min_threshold, snapshot.max_threshold), (20, 80));
    assert!(matches!(shell.max_threshold().error(), Some(ThresholdError::Rejected(_))));
}

#[tokio::test]
async fn test_stop_without_reset() {
    let recorder = recording(instant_backend());
    let (sender, mut receiver) = setup_event_bus();
    let mut shell = ViewShell::new(recorder.clone(), sender).with_thresholds(ThresholdConfig {
        reset_on_stop: false,
        ..ThresholdConfig::default()
    });

    shell.edit_min_threshold("20", Instant::now());
    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;
    shell.toggle_live_view();
    settle(&mut shell, &mut receiver).await;

    assert_eq!(recorder.calls().last(), Some(&Command::StopLiveView));
    assert_eq!(shell.min_threshold().text(), "20");
    assert_eq!(shell.min_threshold().confirmed(), 20);
}

#[tokio::test]
async fn test_notices_expire() {
    let recorder = recording(instant_backend().with_failure(CommandKind::Greet));
    let (sender, mut receiver) = setup_event_bus();
    let mut shell = ViewShell::new(recorder, sender).with_notice_ttl(Duration::from_millis(10));

    shell.greet();
    settle(&mut shell, &mut receiver).await;
    assert_eq!(shell.notices().count(), 1);

    shell.tick(Instant::now() + Duration::from_secs(1));
    assert_eq!(shell.notices().count(), 0);
}

#[tokio::test]
async fn test_commands_issued_in_event_order() {
    let recorder = recording(instant_backend());
    let (mut shell, mut receiver) = setup_shell(recorder.clone());

    shell.edit_name("Ada".to_string());
    let first = shell.greet();
    let second = shell.toggle_live_view().unwrap();
    let third = shell.edit_min_threshold("5", Instant::now()).unwrap();
    assert!(first < second && second < third);

    let events = settle(&mut shell, &mut receiver).await;
    assert_eq!(
        issued_commands(&events),
        vec![
            Command::Greet { name: "Ada".to_string() },
            Command::StartLiveView,
            Command::SetMinThreshold { new_min_threshold: 5 },
        ]
    );
    assert_eq!(shell.in_flight_count(), 0);
}
