use crate::services::smtp_mailer::{MailError, Mailer};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDepositReceipt {
    pub to: String,
    pub customer_name: String,
    pub shop_name: String,
    pub amount: i64,
}

/// A mock mailer that records sent emails for testing purposes.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct MockMailer {
    pub sent_deposit_receipts: Mutex<Vec<RecordedDepositReceipt>>,
    pub sent_subscription_receipts: Mutex<Vec<(String, String)>>,
    pub fail_send: bool,
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_deposit_receipt(
        &self,
        to: &str,
        customer_name: &str,
        shop_name: &str,
        amount: i64,
    ) -> Result<(), MailError> {
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_deposit_receipts
            .lock()
            .unwrap()
            .push(RecordedDepositReceipt {
                to: to.to_string(),
                customer_name: customer_name.to_string(),
                shop_name: shop_name.to_string(),
                amount,
            });
        Ok(())
    }

    async fn send_subscription_receipt(&self, to: &str, shop_name: &str) -> Result<(), MailError> {
        if self.fail_send {
            return Err(MailError::Other("mock failure".into()));
        }
        self.sent_subscription_receipts
            .lock()
            .unwrap()
            .push((to.to_string(), shop_name.to_string()));
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
