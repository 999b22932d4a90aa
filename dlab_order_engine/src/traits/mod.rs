//! Storage traits for the order engine.
//!
//! A backend implements these traits to act as the order store and catalog lookup. The engine
//! APIs and the server's request handlers are generic over them; [`crate::SqliteDatabase`] is
//! the production implementation.

use dlab_common::Rupees;
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    order_objects::{OrderPage, OrderPagination},
};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Mutating order storage. Orders are owned exclusively by the store; nothing else holds a
/// mutable copy.
pub trait OrderDatabase {
    /// Persist a new order together with its line-item snapshot, atomically. Either the whole
    /// order is written or nothing is.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError>;

    /// Conditionally move an order from `from` to `to`.
    ///
    /// The update only matches a row that still has status `from`, which serializes racing
    /// transitions at the storage layer: of two concurrent calls, exactly one matches and the
    /// other gets `None`. `None` is also returned when the order does not exist; the caller
    /// distinguishes the two.
    async fn update_order_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, StorageError>;
}

/// Read-only order queries.
pub trait OrderManagement {
    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, StorageError>;

    /// All orders belonging to the customer, most recent first.
    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StorageError>;

    /// A page of the full order book, most recent first, optionally restricted to one status.
    /// Pages are 1-indexed; a page outside `1..=total_pages` yields an empty page, not an error.
    async fn fetch_orders_paged(&self, pagination: &OrderPagination) -> Result<OrderPage, StorageError>;
}

/// Read-only product lookup, used solely to corroborate client-submitted unit prices at order
/// creation time. Catalog maintenance happens elsewhere.
pub trait ProductCatalog {
    async fn product_price(&self, product_id: &str) -> Result<Option<Rupees>, StorageError>;
}
