use async_trait::async_trait;
use std::any::Any;
use std::fmt;

#[derive(Debug)]
#[allow(dead_code)]
pub enum MailError {
    Other(String),
    InvalidEmailAddress(String),
    SendError(String),
    EnvVarMissing(String),
}

impl fmt::Display for MailError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MailError::Other(e) => write!(f, "Error: {}", e),
            MailError::InvalidEmailAddress(e) => write!(f, "Invalid Address: {}", e),
            MailError::SendError(e) => write!(f, "Send error: {}", e),
            MailError::EnvVarMissing(e) => write!(f, "Env Var Missing: {}", e),
        }
    }
}

impl std::error::Error for MailError {}

use lettre::transport::smtp::Error as SmtpError;

impl From<SmtpError> for MailError {
    fn from(err: SmtpError) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<std::env::VarError> for MailError {
    fn from(err: std::env::VarError) -> Self {
        MailError::EnvVarMissing(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::SendError(err.to_string())
    }
}

impl From<AddressError> for MailError {
    fn from(e: AddressError) -> Self {
        MailError::InvalidEmailAddress(e.to_string())
    }
}

/// Receipts are best-effort: callers log failures and move on, they never
/// fail the surrounding operation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_deposit_receipt(
        &self,
        to: &str,
        customer_name: &str,
        shop_name: &str,
        amount: i64,
    ) -> Result<(), MailError>;

    async fn send_subscription_receipt(&self, to: &str, shop_name: &str) -> Result<(), MailError>;

    #[allow(dead_code)]
    fn as_any(&self) -> &dyn Any;
}

mod mock_mailer;
mod smtp_impl;

use lettre::address::AddressError;
#[allow(unused_imports)]
pub use mock_mailer::MockMailer;
pub use smtp_impl::SmtpMailer;

/// Formats minor currency units as dollars for receipt copy.
pub fn format_amount(amount: i64) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}
