use serde::Deserialize;

/// Server-side catalogue. Amounts are minor currency units and are never
/// taken from the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutProduct {
    pub name: &'static str,
    pub description: &'static str,
    pub amount: i64,
}

pub const BOOKING_DEPOSIT: CheckoutProduct = CheckoutProduct {
    name: "Tattoo Booking Deposit",
    description: "Refundable deposit to secure your tattoo appointment",
    amount: 5000,
};

/// Premium subscription amounts live on the Stripe price objects named in
/// config; only the interval choice is modelled here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Monthly,
    Yearly,
}

impl BillingInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingInterval::Monthly => "monthly",
            BillingInterval::Yearly => "yearly",
        }
    }
}
