use std::fmt::Display;

use dlab_common::Rupees;
use dlab_order_engine::db_types::{CartLine, DeliveryAddress, Order, PaymentMethod};
use razorpay_tools::PaymentConfirmation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    /// Contact email. Required for guest checkout; ignored for authenticated callers, whose
    /// identity comes from the access token rather than the body.
    #[serde(default)]
    pub email: Option<String>,
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: PaymentMethod,
    /// The gateway confirmation triple. Required for gateway orders; must be absent for
    /// cash-on-delivery.
    #[serde(default)]
    pub confirmation: Option<PaymentConfirmation>,
}

/// Body of `PATCH /api/orders/{order_id}`. The status is parsed case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

/// Query string of the staff listing, `GET /api/orders?page=&limit=&status=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Blank is treated the same as absent: all statuses.
    pub status: Option<String>,
}

/// Response of the staff listing. `total` is the number of *pages* under the active filter;
/// this is the contract the storefront admin UI paginates with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub total: u32,
}

/// Body of `POST /api/payments/intent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRequest {
    pub amount: Rupees,
    /// Unique per attempt; the caller's idempotency handle on the gateway side.
    pub receipt: String,
    #[serde(default)]
    pub notes: Option<Value>,
}

/// What the checkout widget needs to collect a payment against the created intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResponse {
    pub order_id: String,
    pub amount: Rupees,
    pub currency: String,
    pub key_id: String,
}
