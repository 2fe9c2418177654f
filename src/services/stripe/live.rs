#![allow(dead_code)]
use super::{
    CheckoutMode, CheckoutSession, CreateCheckoutSessionRequest, PaymentGateway,
    PaymentGatewayError,
};
use async_trait::async_trait;

pub struct LiveStripeGateway {
    client: stripe::Client,
}

impl LiveStripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        let client = stripe::Client::new(secret_key);
        Self { client }
    }

    pub fn from_settings(settings: &crate::config::StripeSettings) -> Self {
        Self::new(settings.secret_key.clone())
    }
}

fn map_mode(mode: CheckoutMode) -> stripe::CheckoutSessionMode {
    match mode {
        CheckoutMode::Payment => stripe::CheckoutSessionMode::Payment,
        CheckoutMode::Subscription => stripe::CheckoutSessionMode::Subscription,
    }
}

fn map_line_item(
    req: &CreateCheckoutSessionRequest,
) -> Result<stripe::CreateCheckoutSessionLineItems, PaymentGatewayError> {
    match (req.mode, &req.product, &req.price_id) {
        (CheckoutMode::Payment, Some(product), _) => Ok(stripe::CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency: stripe::Currency::USD,
                product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: product.name.clone(),
                    description: Some(product.description.clone()),
                    ..Default::default()
                }),
                unit_amount: Some(product.amount),
                ..Default::default()
            }),
            quantity: Some(1),
            ..Default::default()
        }),
        (CheckoutMode::Subscription, _, Some(price_id)) => {
            Ok(stripe::CreateCheckoutSessionLineItems {
                price: Some(price_id.clone()),
                quantity: Some(1),
                ..Default::default()
            })
        }
        _ => Err(PaymentGatewayError::Config(
            "checkout request missing product or price for its mode".into(),
        )),
    }
}

#[async_trait]
impl PaymentGateway for LiveStripeGateway {
    async fn create_checkout_session(
        &self,
        req: CreateCheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentGatewayError> {
        let line_item = map_line_item(&req)?;

        let mut params = stripe::CreateCheckoutSession::new();
        params.mode = Some(map_mode(req.mode));
        params.success_url = Some(&req.success_url);
        params.cancel_url = Some(&req.cancel_url);
        if let Some(ref email) = req.customer_email {
            params.customer_email = Some(email);
        }
        if let Some(ref meta) = req.metadata {
            let mut m = std::collections::HashMap::new();
            for (k, v) in meta.iter() {
                m.insert(k.clone(), v.clone());
            }
            params.metadata = Some(m);
        }
        params.line_items = Some(vec![line_item]);

        let session = stripe::CheckoutSession::create(&self.client, params).await?;
        Ok(CheckoutSession {
            id: session.id.to_string(),
            url: session.url.clone(),
        })
    }

    async fn cancel_subscription(&self, subscription_id: &str) -> Result<(), PaymentGatewayError> {
        let sub_id = subscription_id
            .parse::<stripe::SubscriptionId>()
            .map_err(|e| PaymentGatewayError::Other(e.to_string()))?;
        stripe::Subscription::cancel(&self.client, &sub_id, Default::default()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_mode_without_product_is_a_config_error() {
        let req = CreateCheckoutSessionRequest {
            mode: CheckoutMode::Payment,
            success_url: "https://example.test/success".into(),
            cancel_url: "https://example.test/cancel".into(),
            customer_email: None,
            product: None,
            price_id: None,
            metadata: None,
        };
        assert!(matches!(
            map_line_item(&req),
            Err(PaymentGatewayError::Config(_))
        ));
    }

    #[test]
    fn subscription_mode_without_price_is_a_config_error() {
        let req = CreateCheckoutSessionRequest {
            mode: CheckoutMode::Subscription,
            success_url: "https://example.test/success".into(),
            cancel_url: "https://example.test/cancel".into(),
            customer_email: None,
            product: None,
            price_id: None,
            metadata: None,
        };
        assert!(matches!(
            map_line_item(&req),
            Err(PaymentGatewayError::Config(_))
        ));
    }

    #[tokio::test]
    async fn cancel_with_malformed_subscription_id_maps_to_other_error() {
        let live = LiveStripeGateway::new("sk_test_dummy");
        let result = live.cancel_subscription("not a subscription id").await;
        assert!(matches!(result, Err(PaymentGatewayError::Other(_))));
    }
}
