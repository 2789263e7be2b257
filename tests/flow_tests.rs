use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use subflow::application::controller::FlowController;
use subflow::domain::flow::FlowState;
use subflow::infrastructure::in_memory::{InMemoryGateway, ScriptedStatus, StaticTokenSource};

const CADENCE: Duration = Duration::from_secs(3);

fn flow_over(gateway: &InMemoryGateway, tokens: StaticTokenSource) -> FlowController {
    FlowController::with_cadence(Arc::new(gateway.clone()), Arc::new(tokens), CADENCE)
}

fn counting_action(counter: &Arc<AtomicUsize>) -> Box<dyn FnOnce() + Send> {
    let counter = counter.clone();
    Box::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(start_paused = true)]
async fn test_succeeds_on_the_tick_after_n_rejections() {
    let n = 5;
    let gateway = InMemoryGateway::new();
    gateway
        .enqueue_statuses(vec![ScriptedStatus::NotSubscribed; n])
        .await;
    gateway.enqueue_statuses([ScriptedStatus::Subscribed]).await;

    let confirmations = Arc::new(AtomicUsize::new(0));
    let mut flow = flow_over(&gateway, StaticTokenSource::new("token"));
    let mut state = flow.state();

    flow.subscribe("0712345678", counting_action(&confirmations))
        .await
        .unwrap();

    state
        .wait_for(|s| *s == FlowState::Succeeded)
        .await
        .unwrap();
    tokio::task::yield_now().await;

    assert_eq!(gateway.status_calls(), n + 1);
    assert_eq!(confirmations.load(Ordering::SeqCst), 1);
    assert!(!flow.is_polling());

    // No stray ticks after confirmation.
    tokio::time::sleep(CADENCE * 3).await;
    assert_eq!(gateway.status_calls(), n + 1);
    assert_eq!(confirmations.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_two_pending_polls_then_confirmed() {
    let gateway = InMemoryGateway::new();
    gateway
        .enqueue_statuses([
            ScriptedStatus::NotSubscribed,
            ScriptedStatus::NotSubscribed,
            ScriptedStatus::Subscribed,
        ])
        .await;

    let confirmations = Arc::new(AtomicUsize::new(0));
    let mut flow = flow_over(&gateway, StaticTokenSource::new("token"));
    let mut state = flow.state();

    flow.subscribe("0712345678", counting_action(&confirmations))
        .await
        .unwrap();
    assert_eq!(flow.current_state(), FlowState::Polling);

    state
        .wait_for(|s| *s == FlowState::Succeeded)
        .await
        .unwrap();
    tokio::task::yield_now().await;

    assert_eq!(gateway.initiation_calls(), 1);
    assert_eq!(gateway.status_calls(), 3);
    assert_eq!(confirmations.load(Ordering::SeqCst), 1);
    assert!(!flow.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_transient_poll_failures_are_retried_silently() {
    let gateway = InMemoryGateway::new();
    gateway
        .enqueue_statuses([
            ScriptedStatus::Unreachable,
            ScriptedStatus::Unreachable,
            ScriptedStatus::NotSubscribed,
            ScriptedStatus::Subscribed,
        ])
        .await;

    let confirmations = Arc::new(AtomicUsize::new(0));
    let mut flow = flow_over(&gateway, StaticTokenSource::new("token"));
    let mut state = flow.state();

    flow.subscribe("0712345678", counting_action(&confirmations))
        .await
        .unwrap();

    state
        .wait_for(|s| *s == FlowState::Succeeded)
        .await
        .unwrap();
    assert_eq!(gateway.status_calls(), 4);
    assert_eq!(confirmations.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_scope_exit_while_polling_releases_the_timer() {
    let gateway = InMemoryGateway::new();
    let confirmations = Arc::new(AtomicUsize::new(0));
    let mut flow = flow_over(&gateway, StaticTokenSource::new("token"));

    flow.subscribe("0712345678", counting_action(&confirmations))
        .await
        .unwrap();

    // Let a couple of (not-subscribed) ticks happen first.
    tokio::time::sleep(CADENCE * 2 + Duration::from_millis(100)).await;
    let seen = gateway.status_calls();
    assert!(seen >= 2);

    drop(flow);

    tokio::time::sleep(CADENCE * 10).await;
    assert_eq!(gateway.status_calls(), seen);
    assert_eq!(confirmations.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_shutdown_mid_retry_releases_the_timer() {
    let gateway = InMemoryGateway::new();
    gateway
        .enqueue_statuses(vec![ScriptedStatus::Unreachable; 4])
        .await;
    let confirmations = Arc::new(AtomicUsize::new(0));
    let mut flow = flow_over(&gateway, StaticTokenSource::new("token"));

    flow.subscribe("0712345678", counting_action(&confirmations))
        .await
        .unwrap();
    tokio::time::sleep(CADENCE + Duration::from_millis(100)).await;
    assert!(flow.is_polling());

    flow.shutdown();
    let seen = gateway.status_calls();

    tokio::time::sleep(CADENCE * 10).await;
    assert_eq!(gateway.status_calls(), seen);
    assert!(!flow.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_user_can_retry_after_initiation_failure() {
    let gateway = InMemoryGateway::new();
    gateway.reject_initiation("gateway busy").await;
    gateway.enqueue_statuses([ScriptedStatus::Subscribed]).await;

    let confirmations = Arc::new(AtomicUsize::new(0));
    let mut flow = flow_over(&gateway, StaticTokenSource::new("token"));
    let mut state = flow.state();

    let first = flow
        .subscribe("0712345678", counting_action(&confirmations))
        .await;
    assert!(first.is_err());
    assert!(!flow.current_state().is_busy());

    // Backend recovers; the same controller accepts a fresh attempt.
    gateway.clear_initiation_error().await;

    flow.subscribe("0712345678", counting_action(&confirmations))
        .await
        .unwrap();
    state
        .wait_for(|s| *s == FlowState::Succeeded)
        .await
        .unwrap();
    assert_eq!(confirmations.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.initiation_calls(), 2);
}
