use crate::domain::flow::SubscriptionStatus;
use crate::domain::phone::PhoneNumber;
use crate::domain::ports::{PaymentGateway, RegistrationGateway};
use crate::domain::registration::Registration;
use crate::domain::session::AuthToken;
use crate::error::{Result, SubscribeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Backend client over HTTP.
///
/// Paths mirror the backend routes: `/auth/register`, `/payments/subscribe`
/// and `/payments/status`, all relative to the configured base URL. Protected
/// calls carry the session token as a bearer header.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct SubscribeRequest<'a> {
    phone: &'a PhoneNumber,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Extracts the backend's `{"error": "..."}` message, falling back to the
/// HTTP status line.
async fn rejection_reason(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("server replied {status}"),
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn initiate_subscription(&self, phone: &PhoneNumber, token: &AuthToken) -> Result<()> {
        debug!(%phone, "requesting STK push");
        let response = self
            .client
            .post(self.url("/payments/subscribe"))
            .bearer_auth(token.as_str())
            .json(&SubscribeRequest { phone })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SubscribeError::Initiation(rejection_reason(response).await))
        }
    }

    async fn subscription_status(&self, token: &AuthToken) -> Result<SubscriptionStatus> {
        let response = self
            .client
            .get(self.url("/payments/status"))
            .bearer_auth(token.as_str())
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json::<SubscriptionStatus>().await?)
        } else {
            Err(SubscribeError::Status(rejection_reason(response).await))
        }
    }
}

#[async_trait]
impl RegistrationGateway for HttpPaymentGateway {
    async fn register(&self, registration: &Registration) -> Result<()> {
        debug!(email = %registration.email, "registering account");
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(registration)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SubscribeError::Registration(
                rejection_reason(response).await,
            ))
        }
    }
}
