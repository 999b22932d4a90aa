use chrono::{DateTime, TimeZone, Utc};
use dlab_common::Rupees;
use serde::{Deserialize, Serialize};

/// A gateway order created on Razorpay, i.e. a payment intent.
///
/// Intents are ephemeral: one is created per checkout attempt, consumed by a single verification,
/// and never persisted here. Razorpay tracks their state.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntent {
    /// The gateway-assigned order id, e.g. `order_IluGWxBm9U8zJ8`.
    pub id: String,
    pub amount: Rupees,
    pub currency: String,
    /// The caller-supplied receipt reference. Each attempt must use a unique receipt so that
    /// retries are distinguishable on the gateway side.
    pub receipt: String,
    pub created_at: DateTime<Utc>,
}

/// The raw `/v1/orders` response. Amounts are integer paise and timestamps unix seconds.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawGatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub created_at: i64,
}

impl From<RawGatewayOrder> for PaymentIntent {
    fn from(raw: RawGatewayOrder) -> Self {
        let created_at = Utc.timestamp_opt(raw.created_at, 0).single().unwrap_or_else(Utc::now);
        Self {
            id: raw.id,
            amount: Rupees::from_paise(raw.amount),
            currency: raw.currency,
            receipt: raw.receipt.unwrap_or_default(),
            created_at,
        }
    }
}

/// The confirmation bundle the Razorpay checkout handler passes back to the client after a
/// successful payment. The field names match the widget's payload verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    /// Hex-encoded HMAC-SHA256 over `"{order_id}|{payment_id}"` under the API secret.
    pub razorpay_signature: String,
}

/// The outcome of checking a [`PaymentConfirmation`] against the shared secret.
///
/// This check is the sole boundary between "the customer claims to have paid" and "the order is
/// recorded as paid". There is no third state: anything other than an exact signature match is a
/// mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a verification verdict that is not inspected defeats the point of verifying"]
pub enum VerificationResult {
    Verified,
    SignatureMismatch,
}

impl VerificationResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationResult::Verified)
    }
}
