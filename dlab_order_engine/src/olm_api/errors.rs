use thiserror::Error;

use crate::{
    db_types::{OrderId, OrderStatus},
    traits::StorageError,
};

#[derive(Debug, Error)]
pub enum OrderFlowError {
    #[error("Invalid line item. {0}")]
    InvalidLineItem(String),
    #[error("Invalid delivery address. {0}")]
    InvalidAddress(String),
    /// The catalog does not corroborate the unit price the client submitted, either because the
    /// prices differ or because the product is unknown.
    #[error("The submitted price for product {product_id} does not match the catalog")]
    PriceMismatch { product_id: String },
    #[error("A gateway order requires a verified payment confirmation")]
    PaymentProofMissing,
    #[error("A cash-on-delivery order cannot carry a gateway payment reference")]
    UnexpectedPaymentProof,
    #[error("The status change {from} -> {to} is not allowed")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error(transparent)]
    StorageError(#[from] StorageError),
}
