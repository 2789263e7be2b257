use crate::domain::flow::FlowState;
use crate::domain::ports::SharedGateway;
use crate::domain::session::AuthToken;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Interval between successive status checks.
pub const DEFAULT_CADENCE: Duration = Duration::from_secs(3);

/// Invoked exactly once when the backend confirms the subscription.
pub type ExitAction = Box<dyn FnOnce() + Send + 'static>;

/// Ownership token for one live polling task.
struct PollHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    fn is_live(&self) -> bool {
        !self.task.is_finished()
    }

    fn cancel(self) {
        // No receivers left means the task already finished on its own.
        let _ = self.shutdown.send(true);
    }
}

/// Runs the recurring subscription-status check.
///
/// At most one polling task is live at a time: `start` is a no-op while a
/// task runs, and `cancel` is safe with no task and safe to call twice.
/// Each tick awaits its status query to completion before the next cadence
/// wait begins, so queries never overlap. A query error or a
/// not-yet-subscribed reply keeps the loop going with no backoff and no
/// attempt ceiling, until confirmation or cancellation.
pub struct StatusPoller {
    gateway: SharedGateway,
    state: watch::Sender<FlowState>,
    cadence: Duration,
    handle: Option<PollHandle>,
}

impl StatusPoller {
    pub fn new(
        gateway: SharedGateway,
        state: watch::Sender<FlowState>,
        cadence: Duration,
    ) -> Self {
        Self {
            gateway,
            state,
            cadence,
            handle: None,
        }
    }

    /// True while a polling task is live.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(PollHandle::is_live)
    }

    /// Starts the polling task. No-op if one is already live.
    ///
    /// The first status query fires one cadence after the call; confirmation
    /// terminates the task right after `on_confirmed` runs.
    pub fn start(&mut self, token: AuthToken, on_confirmed: ExitAction) {
        if self.is_active() {
            debug!("polling already active, ignoring start");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let gateway = self.gateway.clone();
        let state = self.state.clone();
        let cadence = self.cadence;
        let mut on_confirmed = Some(on_confirmed);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = tokio::time::sleep(cadence) => {}
                }
                // Cancel may have raced the cadence wait.
                if *shutdown_rx.borrow() {
                    break;
                }

                match gateway.subscription_status(&token).await {
                    Ok(status) if status.subscribed => {
                        // A confirmation that lands after cancellation is
                        // discarded; the query itself cannot be aborted.
                        if *shutdown_rx.borrow() {
                            break;
                        }
                        state.send_replace(FlowState::Succeeded);
                        if let Some(action) = on_confirmed.take() {
                            action();
                        }
                        break;
                    }
                    Ok(_) => {
                        debug!("not subscribed yet, will check again");
                    }
                    Err(err) => {
                        // Keep trying; transient failures are never terminal.
                        debug!(error = %err, "status check failed, will retry");
                    }
                }
            }
        });

        self.handle = Some(PollHandle {
            shutdown: shutdown_tx,
            task,
        });
    }

    /// Cancels the live polling task, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("cancelling status polling");
            handle.cancel();
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}
