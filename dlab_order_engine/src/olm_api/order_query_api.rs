use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Order, OrderId},
    order_objects::{OrderPage, OrderPagination},
    traits::{OrderManagement, StorageError},
};

/// Read-only access to the order book. Every method is safe to call concurrently with mutations;
/// a page boundary shifting under a concurrent insert is acceptable.
pub struct OrderQueryApi<B> {
    db: B,
}

impl<B> Debug for OrderQueryApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderQueryApi")
    }
}

impl<B> OrderQueryApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderQueryApi<B>
where B: OrderManagement
{
    pub async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, StorageError> {
        self.db.fetch_order_by_id(id).await
    }

    /// All of a customer's orders, most recent first.
    pub async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StorageError> {
        let orders = self.db.fetch_orders_for_customer(customer_id).await?;
        trace!("🧾️ Fetched {} orders for customer {customer_id}", orders.len());
        Ok(orders)
    }

    /// A page of the full order book. See [`OrderPagination`] for the paging rules.
    pub async fn orders_paged(&self, pagination: &OrderPagination) -> Result<OrderPage, StorageError> {
        let page = self.db.fetch_orders_paged(pagination).await?;
        trace!("🧾️ Fetched {} of {} pages ({} orders)", pagination.page, page.total_pages, page.orders.len());
        Ok(page)
    }
}
