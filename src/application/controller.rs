use crate::application::poller::{DEFAULT_CADENCE, ExitAction, StatusPoller};
use crate::domain::flow::{FailureReason, FlowState};
use crate::domain::phone::PhoneNumber;
use crate::domain::ports::{SharedGateway, SharedTokenSource};
use crate::error::{Result, SubscribeError};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Orchestrates one subscription attempt end to end.
///
/// Owns the flow state and the poller. All collaborators are injected, so the
/// controller runs against any gateway and token source, real or in-memory.
/// Dropping the controller cancels a live poll unconditionally, whatever
/// state the flow is in.
pub struct FlowController {
    gateway: SharedGateway,
    tokens: SharedTokenSource,
    state: watch::Sender<FlowState>,
    poller: StatusPoller,
}

impl FlowController {
    pub fn new(gateway: SharedGateway, tokens: SharedTokenSource) -> Self {
        Self::with_cadence(gateway, tokens, DEFAULT_CADENCE)
    }

    pub fn with_cadence(
        gateway: SharedGateway,
        tokens: SharedTokenSource,
        cadence: Duration,
    ) -> Self {
        let (state, _) = watch::channel(FlowState::Idle);
        let poller = StatusPoller::new(gateway.clone(), state.clone(), cadence);
        Self {
            gateway,
            tokens,
            state,
            poller,
        }
    }

    /// Channel the presentation layer watches for state changes.
    pub fn state(&self) -> watch::Receiver<FlowState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> FlowState {
        self.state.borrow().clone()
    }

    /// True while the status poll task is live.
    pub fn is_polling(&self) -> bool {
        self.poller.is_active()
    }

    /// Validates the phone, requests the STK push and starts polling.
    ///
    /// Returns once initiation is settled; confirmation arrives later through
    /// the state channel, and `on_confirmed` runs exactly once when it does.
    /// A call while a previous attempt is still polling is ignored.
    pub async fn subscribe(&mut self, raw_phone: &str, on_confirmed: ExitAction) -> Result<()> {
        if self.poller.is_active() {
            debug!("payment attempt already in flight, ignoring re-submission");
            return Ok(());
        }

        self.state.send_replace(FlowState::Validating);
        let phone = match raw_phone.parse::<PhoneNumber>() {
            Ok(phone) => phone,
            Err(err) => {
                self.fail(FailureReason::Validation(err.to_string()));
                return Err(err);
            }
        };

        self.state.send_replace(FlowState::AwaitingInitiation);
        let Some(token) = self.tokens.token() else {
            self.fail(FailureReason::MissingToken);
            return Err(SubscribeError::MissingToken);
        };

        match self.gateway.initiate_subscription(&phone, &token).await {
            Ok(()) => {
                info!(%phone, "STK push requested, waiting for payment");
                self.state.send_replace(FlowState::Polling);
                self.poller.start(token, on_confirmed);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "payment initiation failed");
                self.fail(FailureReason::Initiation(err.to_string()));
                Err(err)
            }
        }
    }

    /// Cancels a live poll and leaves the flow where it is.
    pub fn shutdown(&mut self) {
        self.poller.cancel();
    }

    fn fail(&self, reason: FailureReason) {
        self.state.send_replace(FlowState::Failed(reason));
    }
}
