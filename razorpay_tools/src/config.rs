use std::time::Duration;

use dlab_common::Secret;
use log::*;

const DEFAULT_RAZORPAY_BASE_URL: &str = "https://api.razorpay.com";
const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RazorpayConfig {
    /// The public key id, shared with the checkout widget on the client.
    pub key_id: String,
    /// The API secret. Used for basic auth against the REST API and as the HMAC key for payment
    /// signature verification. Never leaves this crate.
    pub api_secret: Secret<String>,
    /// Override for the API host. Only useful for pointing the client at a test double.
    pub base_url: String,
    /// Upper bound on any single gateway call. A call that exceeds it surfaces as
    /// [`RazorpayApiError::Unavailable`](crate::RazorpayApiError::Unavailable).
    pub timeout: Duration,
}

impl Default for RazorpayConfig {
    fn default() -> Self {
        Self {
            key_id: String::default(),
            api_secret: Secret::default(),
            base_url: DEFAULT_RAZORPAY_BASE_URL.to_string(),
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let key_id = std::env::var("RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("🪛️ RAZORPAY_KEY_ID is not set. Gateway payments will be rejected upstream.");
            "rzp_test_0000000000".to_string()
        });
        let api_secret = Secret::new(std::env::var("RAZORPAY_API_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ RAZORPAY_API_SECRET is not set. Payment verification cannot succeed without it.");
            String::default()
        }));
        let base_url =
            std::env::var("RAZORPAY_BASE_URL").unwrap_or_else(|_| DEFAULT_RAZORPAY_BASE_URL.to_string());
        let timeout = std::env::var("DLAB_GATEWAY_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for DLAB_GATEWAY_TIMEOUT. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_GATEWAY_TIMEOUT);
        Self { key_id, api_secret, base_url, timeout }
    }
}
