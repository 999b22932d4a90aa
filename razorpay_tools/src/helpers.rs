//! # Payment signature scheme
//!
//! When a checkout succeeds, Razorpay hands the client a `(order_id, payment_id, signature)`
//! triple. The signature is an HMAC-SHA256 over the string `"{order_id}|{payment_id}"`, keyed
//! with the merchant's API secret and hex-encoded.
//!
//! Recomputing that HMAC server-side and comparing it against the supplied value is what turns
//! "the customer says they paid" into "the payment really settled". The comparison runs in
//! constant time, and a signature that is not even valid hex is treated exactly like a wrong
//! one.

use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use sha2::Sha256;

use crate::data_objects::{PaymentConfirmation, VerificationResult};

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn signature_message(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

fn keyed_mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length")
}

/// Produce the hex signature for a gateway order / payment pair. The gateway does this on its
/// side; we only need it for tooling and tests.
pub fn sign_confirmation(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = keyed_mac(secret);
    mac.update(signature_message(order_id, payment_id).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub(crate) fn verify_confirmation(secret: &str, confirmation: &PaymentConfirmation) -> VerificationResult {
    let supplied = match hex::decode(&confirmation.razorpay_signature) {
        Ok(bytes) => bytes,
        Err(_) => return VerificationResult::SignatureMismatch,
    };
    let mut mac = keyed_mac(secret);
    mac.update(signature_message(&confirmation.razorpay_order_id, &confirmation.razorpay_payment_id).as_bytes());
    match mac.verify_slice(&supplied) {
        Ok(()) => VerificationResult::Verified,
        Err(_) => VerificationResult::SignatureMismatch,
    }
}

/// A unique receipt reference for a new payment intent. Retried intent creations must use a fresh
/// receipt so the attempts stay distinguishable on the gateway side.
pub fn fresh_receipt() -> String {
    let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(12).map(char::from).collect();
    format!("rcpt-{suffix}")
}
