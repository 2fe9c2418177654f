#![allow(dead_code)]
use super::{
    CheckoutSession, CreateCheckoutSessionRequest, PaymentGateway, PaymentGatewayError,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Default)]
pub struct MockStripeGateway {
    pub created_sessions: Arc<Mutex<Vec<CheckoutSession>>>,
    pub last_create_requests: Arc<Mutex<Vec<CreateCheckoutSessionRequest>>>,
    pub cancelled_subscriptions: Arc<Mutex<Vec<String>>>,
    pub fail_checkout: bool,
    pub fail_cancel: bool,
}

impl MockStripeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_checkout: true,
            fail_cancel: true,
            ..Self::default()
        }
    }
}

fn make_id(prefix: &str) -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{}_{}", prefix, ts)
}

#[async_trait]
impl PaymentGateway for MockStripeGateway {
    async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        // capture the request
        self.last_create_requests.lock().unwrap().push(req.clone());

        if self.fail_checkout {
            return Err(PaymentGatewayError::Api("mock checkout failure".into()));
        }

        // synthesize a session
        let session = CheckoutSession {
            id: make_id("cs_test"),
            url: Some("https://example.test/checkout".into()),
        };
        self.created_sessions.lock().unwrap().push(session.clone());
        Ok(session)
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), PaymentGatewayError> {
        self.cancelled_subscriptions
            .lock()
            .unwrap()
            .push(subscription_id.to_string());

        if self.fail_cancel {
            return Err(PaymentGatewayError::Api("mock cancel failure".into()));
        }

        Ok(())
    }
}
