//! # Razorpay tools
//!
//! A thin client for the parts of the Razorpay API that the Dessert Lab storefront uses:
//!
//! * Creating a gateway order (a payment intent) that the checkout widget completes on the
//!   client's device, and
//! * verifying the signature Razorpay hands back to the client once a payment succeeds.
//!
//! The gateway is the source of truth for payment-intent state. Nothing in this crate persists
//! anything; the storefront decides what to do with a verified payment.
//!
//! The API secret used for both authentication and signature verification lives in
//! [`RazorpayConfig`] and is not exposed to other components.

mod api;
mod config;
mod error;

mod data_objects;
mod helpers;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{PaymentConfirmation, PaymentIntent, VerificationResult};
pub use error::RazorpayApiError;
pub use helpers::{fresh_receipt, sign_confirmation};
