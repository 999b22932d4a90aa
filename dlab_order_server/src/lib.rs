//! # Dessert Lab order server
//!
//! The HTTP shell around the order engine. It is responsible for:
//! * authenticating callers against the tokens minted by the user service and enforcing
//!   role-gated access per route,
//! * translating request payloads into engine calls (order creation, status transitions,
//!   listings) and engine errors into HTTP responses,
//! * brokering payment-intent creation and payment verification against the gateway.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! * `GET /health` — liveness check.
//! * `POST /api/orders` — place an order (customer token; cash-on-delivery may be opened to
//!   guests via configuration).
//! * `GET /api/orders/{customer_id}` — a customer's own orders (admins may read any).
//! * `GET /api/orders?page=&limit=&status=` — paged listing for staff.
//! * `PATCH /api/orders/{order_id}` — staff-only fulfillment transition.
//! * `POST /api/payments/intent` — create a gateway payment intent.
//! * `POST /api/payments/verify` — verify a gateway payment confirmation.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
