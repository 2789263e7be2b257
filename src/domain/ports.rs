use crate::domain::flow::SubscriptionStatus;
use crate::domain::phone::PhoneNumber;
use crate::domain::registration::Registration;
use crate::domain::session::AuthToken;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Backend payment service, as seen from the flow.
///
/// Both calls require an authorization token; enforcing its presence is the
/// caller's job so that a missing token never turns into a network error.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Asks the backend to fire an STK push for the subscription fee.
    async fn initiate_subscription(&self, phone: &PhoneNumber, token: &AuthToken) -> Result<()>;

    /// One status check. Returns the backend's current view of the
    /// subscription, without interpretation.
    async fn subscription_status(&self, token: &AuthToken) -> Result<SubscriptionStatus>;
}

#[async_trait]
pub trait RegistrationGateway: Send + Sync {
    async fn register(&self, registration: &Registration) -> Result<()>;
}

/// Read-only accessor to the current session's credential.
pub trait TokenSource: Send + Sync {
    fn token(&self) -> Option<AuthToken>;
}

pub type SharedGateway = Arc<dyn PaymentGateway>;
pub type SharedTokenSource = Arc<dyn TokenSource>;
