use std::fmt::Debug;

use dlab_common::Rupees;
use log::*;
use sqlx::SqlitePool;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    order_objects::{OrderPage, OrderPagination},
    sqlite::{catalog, db, orders},
    traits::{OrderDatabase, OrderManagement, ProductCatalog, StorageError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connect to (or create) the database at `url` and apply the schema.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let pool = db::new_pool(url, max_connections).await?;
        db::create_schema(&pool).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Provisioning hook for the catalog lookup table. The storefront only ever reads product
    /// prices; writing them is the catalog service's job, and this is its entry point (also used
    /// to seed test fixtures).
    pub async fn upsert_product(
        &self,
        product_id: &str,
        product_name: &str,
        price: Rupees,
    ) -> Result<(), StorageError> {
        let mut conn = self.pool.acquire().await?;
        catalog::upsert_product(product_id, product_name, price, &mut conn).await
    }
}

impl OrderDatabase for SqliteDatabase {
    /// Saves the order and its line-item snapshot in a single transaction. Either everything
    /// lands or nothing does.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError> {
        let mut tx = self.pool.begin().await?;
        let row = orders::insert_order(&order, &mut tx).await?;
        orders::insert_order_items(&row.order_id, &order.items, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} saved with internal id {}", row.order_id, row.id);
        Ok(row.into_order(order.items))
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order_status(id, from, to, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(id, &mut conn).await
    }

    async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_customer(customer_id, &mut conn).await
    }

    async fn fetch_orders_paged(&self, pagination: &OrderPagination) -> Result<OrderPage, StorageError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_paged(pagination, &mut conn).await
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn product_price(&self, product_id: &str) -> Result<Option<Rupees>, StorageError> {
        let mut conn = self.pool.acquire().await?;
        catalog::product_price(product_id, &mut conn).await
    }
}
