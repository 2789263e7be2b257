use serde::Deserialize;

/// Why a flow attempt ended in `FlowState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Malformed phone input. Detected locally, nothing was sent.
    Validation(String),
    /// No session token present for a protected call.
    MissingToken,
    /// The payment-initiation request was rejected or never arrived.
    Initiation(String),
}

/// Lifecycle of one subscription attempt.
///
/// Owned exclusively by the flow controller and published through a watch
/// channel; `Polling` is the only non-terminal looping state. Transient poll
/// failures do not appear here at all, they are retried silently.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Validating,
    AwaitingInitiation,
    Polling,
    Succeeded,
    Failed(FailureReason),
}

impl FlowState {
    /// True while a payment attempt is in flight and re-submission is blocked.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Validating | Self::AwaitingInitiation | Self::Polling
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}

/// Reply of the subscription status endpoint.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SubscriptionStatus {
    pub subscribed: bool,
}
