use std::sync::Arc;

use dlab_common::Rupees;
use log::*;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::RazorpayConfig,
    data_objects::{PaymentConfirmation, PaymentIntent, RawGatewayOrder, VerificationResult},
    helpers,
    RazorpayApiError,
};

/// The smallest order the gateway accepts (₹1.00). Checking locally saves a round trip for
/// requests that cannot possibly succeed.
const MIN_ORDER_AMOUNT: Rupees = Rupees::from_paise(100);

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RazorpayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// The public key id the checkout widget needs.
    pub fn key_id(&self) -> &str {
        self.config.key_id.as_str()
    }

    /// Create a new gateway order (payment intent) for the given amount.
    ///
    /// `receipt` must be unique per attempt; it is the caller's idempotency handle. This call is
    /// never retried internally. A timeout or connection failure surfaces as
    /// [`RazorpayApiError::Unavailable`] and the caller decides whether to try again with a fresh
    /// receipt.
    pub async fn create_order(
        &self,
        amount: Rupees,
        currency: &str,
        receipt: &str,
        notes: Option<Value>,
    ) -> Result<PaymentIntent, RazorpayApiError> {
        if amount < MIN_ORDER_AMOUNT {
            return Err(RazorpayApiError::Rejected {
                status: 400,
                message: format!("Order amount {amount} is below the gateway minimum of {MIN_ORDER_AMOUNT}"),
            });
        }
        let url = format!("{}/v1/orders", self.config.base_url);
        let mut body = serde_json::json!({
            "amount": amount.value(),
            "currency": currency,
            "receipt": receipt,
        });
        if let Some(notes) = notes {
            body["notes"] = notes;
        }
        trace!("💳️ Creating gateway order for {amount} with receipt {receipt}");
        let response = self
            .client
            .post(url)
            .basic_auth(&self.config.key_id, Some(self.config.api_secret.reveal()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("💳️ Gateway order creation did not complete. {e}");
                RazorpayApiError::Unavailable(e.to_string())
            })?;
        if response.status().is_success() {
            let raw = response
                .json::<RawGatewayOrder>()
                .await
                .map_err(|e| RazorpayApiError::JsonError(e.to_string()))?;
            let intent = PaymentIntent::from(raw);
            debug!("💳️ Gateway order {} created for {}", intent.id, intent.amount);
            Ok(intent)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| RazorpayApiError::Unavailable(e.to_string()))?;
            debug!("💳️ Gateway declined order creation. Status {status}. {message}");
            Err(RazorpayApiError::Rejected { status, message })
        }
    }

    /// Check a payment confirmation against the shared secret.
    ///
    /// Pure computation: no network call, no timeout. Returns
    /// [`VerificationResult::Verified`] only on an exact, constant-time HMAC match. A mismatch is
    /// a security event and is logged as such.
    pub fn verify_payment(&self, confirmation: &PaymentConfirmation) -> VerificationResult {
        let result = helpers::verify_confirmation(self.config.api_secret.reveal(), confirmation);
        match result {
            VerificationResult::Verified => {
                debug!(
                    "💳️ Payment {} against gateway order {} verified",
                    confirmation.razorpay_payment_id, confirmation.razorpay_order_id
                );
            },
            VerificationResult::SignatureMismatch => {
                warn!(
                    "🚨️ Payment signature mismatch for gateway order {} / payment {}. Someone may be probing the \
                     verification endpoint.",
                    confirmation.razorpay_order_id, confirmation.razorpay_payment_id
                );
            },
        }
        result
    }
}
