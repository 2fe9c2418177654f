// NOTE: async-stripe is compiled with a minimal feature set (runtime-tokio-hyper, checkout and
// billing). Touching APIs outside those features will require updating Cargo.toml explicitly so we
// keep compile times and binary size in check.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod signature;

#[derive(Debug, thiserror::Error)]
pub enum PaymentGatewayError {
    #[error("stripe api error: {0}")]
    Api(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("other error: {0}")]
    Other(String),
}

impl From<stripe::StripeError> for PaymentGatewayError {
    fn from(err: stripe::StripeError) -> Self {
        PaymentGatewayError::Api(err.to_string())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

/// One-off product priced inline, used for deposit charges.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineProduct {
    pub name: String,
    pub description: String,
    /// Minor currency units.
    pub amount: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateCheckoutSessionRequest {
    pub mode: CheckoutMode,
    pub success_url: String,
    pub cancel_url: String,
    pub customer_email: Option<String>,
    /// Set for payment mode.
    pub product: Option<InlineProduct>,
    /// Set for subscription mode.
    pub price_id: Option<String>,
    /// Carries the correlation key (`bookingId` or `artistId`) the webhook
    /// reconciler reads back out of the completed session.
    pub metadata: Option<std::collections::BTreeMap<String, String>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError>;

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), PaymentGatewayError>;
}

mod live;
mod mock;

#[allow(unused_imports)]
pub use live::LiveStripeGateway;
#[allow(unused_imports)]
pub use mock::MockStripeGateway;
