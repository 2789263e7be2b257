use crate::domain::flow::SubscriptionStatus;
use crate::domain::phone::PhoneNumber;
use crate::domain::ports::{PaymentGateway, RegistrationGateway, TokenSource};
use crate::domain::registration::Registration;
use crate::domain::session::AuthToken;
use crate::error::{Result, SubscribeError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Scripted reply for one status tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedStatus {
    Subscribed,
    NotSubscribed,
    /// Transport failure for this tick.
    Unreachable,
}

#[derive(Default)]
struct GatewayInner {
    initiation_error: Mutex<Option<String>>,
    registration_error: Mutex<Option<String>>,
    statuses: Mutex<VecDeque<ScriptedStatus>>,
    initiations: AtomicUsize,
    status_checks: AtomicUsize,
    registrations: Mutex<Vec<Registration>>,
}

/// A scriptable in-memory payment gateway.
///
/// Replies to status checks from a queued script, falling back to
/// not-subscribed once the script runs out, and counts every call it
/// receives. Clones share state.
#[derive(Default, Clone)]
pub struct InMemoryGateway {
    inner: Arc<GatewayInner>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent initiation requests fail with the given reason.
    pub async fn reject_initiation(&self, reason: impl Into<String>) {
        *self.inner.initiation_error.lock().await = Some(reason.into());
    }

    /// Lets initiation requests succeed again.
    pub async fn clear_initiation_error(&self) {
        *self.inner.initiation_error.lock().await = None;
    }

    /// Makes subsequent registration requests fail with the given reason.
    pub async fn reject_registration(&self, reason: impl Into<String>) {
        *self.inner.registration_error.lock().await = Some(reason.into());
    }

    /// Appends replies to the status script, consumed one per tick.
    pub async fn enqueue_statuses(&self, replies: impl IntoIterator<Item = ScriptedStatus>) {
        self.inner.statuses.lock().await.extend(replies);
    }

    pub fn initiation_calls(&self) -> usize {
        self.inner.initiations.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.inner.status_checks.load(Ordering::SeqCst)
    }

    pub async fn registrations(&self) -> Vec<Registration> {
        self.inner.registrations.lock().await.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn initiate_subscription(&self, _phone: &PhoneNumber, _token: &AuthToken) -> Result<()> {
        self.inner.initiations.fetch_add(1, Ordering::SeqCst);
        match self.inner.initiation_error.lock().await.as_ref() {
            Some(reason) => Err(SubscribeError::Initiation(reason.clone())),
            None => Ok(()),
        }
    }

    async fn subscription_status(&self, _token: &AuthToken) -> Result<SubscriptionStatus> {
        self.inner.status_checks.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .inner
            .statuses
            .lock()
            .await
            .pop_front()
            .unwrap_or(ScriptedStatus::NotSubscribed);

        match reply {
            ScriptedStatus::Subscribed => Ok(SubscriptionStatus { subscribed: true }),
            ScriptedStatus::NotSubscribed => Ok(SubscriptionStatus { subscribed: false }),
            ScriptedStatus::Unreachable => {
                Err(SubscribeError::Transport("gateway unreachable".to_string()))
            }
        }
    }
}

#[async_trait]
impl RegistrationGateway for InMemoryGateway {
    async fn register(&self, registration: &Registration) -> Result<()> {
        match self.inner.registration_error.lock().await.as_ref() {
            Some(reason) => Err(SubscribeError::Registration(reason.clone())),
            None => {
                self.inner
                    .registrations
                    .lock()
                    .await
                    .push(registration.clone());
                Ok(())
            }
        }
    }
}

/// Token source with a fixed, in-memory credential.
#[derive(Clone, Default)]
pub struct StaticTokenSource {
    token: Option<AuthToken>,
}

impl StaticTokenSource {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(AuthToken::new(token)),
        }
    }

    /// A source with no credential, for exercising the precondition path.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl TokenSource for StaticTokenSource {
    fn token(&self) -> Option<AuthToken> {
        self.token.clone()
    }
}
