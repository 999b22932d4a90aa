use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use dlab_common::Rupees;
use log::error;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public identifier of an order. Opaque, generated server-side at creation; never
/// client-supplied.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    /// A fresh order id: `ord-` followed by 16 random alphanumeric characters.
    pub fn random() -> Self {
        let suffix: String =
            rand::thread_rng().sample_iter(&Alphanumeric).take(16).map(char::from).collect();
        Self(format!("ord-{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------      OrderStatus      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created and payment is collected out-of-band at delivery.
    Pending,
    /// The order was settled via the payment gateway before it became visible.
    Paid,
    /// Fulfillment finished. Terminal.
    Completed,
    /// Fulfillment aborted. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// The fulfillment state machine. The only edges are `Pending -> Completed` and
    /// `Pending -> Cancelled`; everything else is rejected.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Completed) | (OrderStatus::Pending, OrderStatus::Cancelled)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatus {
    type Err = ConversionError;

    /// Case-insensitive: the storefront UI sends `completed` and `cancelled` in lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in storage: {value}. This conversion cannot fail. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------     PaymentMethod     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Settled up-front through the payment gateway.
    Gateway,
    /// Settled at the door; the order starts `Pending` and carries no payment reference.
    CashOnDelivery,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Gateway => write!(f, "gateway"),
            PaymentMethod::CashOnDelivery => write!(f, "cash-on-delivery"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gateway" => Ok(Self::Gateway),
            "cash-on-delivery" | "cod" => Ok(Self::CashOnDelivery),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!(
                "Invalid payment method in storage: {value}. This conversion cannot fail. Defaulting to \
                 cash-on-delivery"
            );
            PaymentMethod::CashOnDelivery
        })
    }
}

//--------------------------------------       CartLine        -------------------------------------------------------
/// One line of a cart, and (snapshotted) one line of a placed order.
///
/// A quantity of zero means the line is absent; it is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CartLine {
    /// Reference into the product catalog. The catalog is not owned here.
    pub product_id: String,
    pub product_name: String,
    /// Unit price as submitted by the client. Corroborated against the catalog before an order
    /// is accepted.
    pub price: Rupees,
    pub qty: u32,
}

//--------------------------------------    PriceBreakdown     -------------------------------------------------------
/// The derived pricing of a cart. Never mutated independently: `total` is always
/// `subtotal + delivery_fee + tax`, and `subtotal` is always the sum over the lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub subtotal: Rupees,
    pub delivery_fee: Rupees,
    pub tax: Rupees,
    pub total: Rupees,
}

//--------------------------------------   DeliveryAddress     -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub name: String,
    pub phone: String,
    /// Free-text street address.
    pub address: String,
    pub city: String,
    pub state: String,
    /// 6-digit numeric PIN code.
    pub postal_code: String,
    pub country: String,
}

//--------------------------------------   PaymentReference    -------------------------------------------------------
/// Proof that a gateway payment for this order was verified. Present exactly on gateway-settled
/// orders; cash-on-delivery orders never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReference {
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    /// The signature that passed verification.
    pub signature: String,
}

//--------------------------------------        Order          -------------------------------------------------------
/// The central persisted entity. Line items and pricing are frozen at creation; only `status`
/// and `updated_at` ever change, and only through the fulfillment state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: String,
    pub email: String,
    pub items: Vec<CartLine>,
    pub pricing: PriceBreakdown,
    /// Absent only for order types that do not involve delivery.
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: PaymentMethod,
    pub payment: Option<PaymentReference>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      OrderDraft       -------------------------------------------------------
/// What a creation request boils down to after the transport layer has done its work: the cart,
/// the identity of the buyer, and — for gateway orders — the verified payment reference.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub customer_id: String,
    pub email: String,
    pub items: Vec<CartLine>,
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: PaymentMethod,
    /// Must be `Some` for gateway orders (produced by a successful signature verification) and
    /// `None` for cash-on-delivery.
    pub payment: Option<PaymentReference>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
/// A fully validated, priced order ready for insertion. Produced only by the order flow API.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: OrderId,
    pub customer_id: String,
    pub email: String,
    pub items: Vec<CartLine>,
    pub pricing: PriceBreakdown,
    pub delivery_address: Option<DeliveryAddress>,
    pub payment_method: PaymentMethod,
    pub payment: Option<PaymentReference>,
    pub status: OrderStatus,
}
