use chrono::{DateTime, Utc};
use dlab_common::Rupees;
use log::trace;
use sqlx::{FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{
        CartLine,
        DeliveryAddress,
        NewOrder,
        Order,
        OrderId,
        OrderStatus,
        PaymentMethod,
        PaymentReference,
        PriceBreakdown,
    },
    order_objects::{OrderPage, OrderPagination},
    traits::StorageError,
};

/// The flat `orders` row. Line items live in `order_items` and are attached separately, so
/// every function here returns either a row (no items yet) or a composed [`Order`].
#[derive(Debug, Clone, FromRow)]
pub(crate) struct OrderRow {
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: String,
    pub email: String,
    pub subtotal: Rupees,
    pub delivery_fee: Rupees,
    pub tax: Rupees,
    pub total: Rupees,
    pub recipient: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub payment_method: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn delivery_address(&self) -> Option<DeliveryAddress> {
        Some(DeliveryAddress {
            name: self.recipient.clone()?,
            phone: self.phone.clone()?,
            address: self.address.clone()?,
            city: self.city.clone()?,
            state: self.state.clone()?,
            postal_code: self.postal_code.clone()?,
            country: self.country.clone()?,
        })
    }

    fn payment_reference(&self) -> Option<PaymentReference> {
        Some(PaymentReference {
            gateway_order_id: self.gateway_order_id.clone()?,
            gateway_payment_id: self.gateway_payment_id.clone()?,
            signature: self.gateway_signature.clone()?,
        })
    }

    pub(crate) fn into_order(self, items: Vec<CartLine>) -> Order {
        let delivery_address = self.delivery_address();
        let payment = self.payment_reference();
        Order {
            id: self.id,
            order_id: self.order_id,
            customer_id: self.customer_id,
            email: self.email,
            items,
            pricing: PriceBreakdown {
                subtotal: self.subtotal,
                delivery_fee: self.delivery_fee,
                tax: self.tax,
                total: self.total,
            },
            delivery_address,
            payment_method: PaymentMethod::from(self.payment_method),
            payment,
            status: OrderStatus::from(self.status),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Inserts the order row. Not atomic on its own: run it inside a transaction together with
/// [`insert_order_items`] and pass `&mut *tx` as the connection.
pub(crate) async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<OrderRow, StorageError> {
    let address = order.delivery_address.as_ref();
    let payment = order.payment.as_ref();
    let row: OrderRow = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_id,
                email,
                subtotal,
                delivery_fee,
                tax,
                total,
                recipient,
                phone,
                address,
                city,
                state,
                postal_code,
                country,
                payment_method,
                gateway_order_id,
                gateway_payment_id,
                gateway_signature,
                status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *;
        "#,
    )
    .bind(&order.order_id)
    .bind(&order.customer_id)
    .bind(&order.email)
    .bind(order.pricing.subtotal)
    .bind(order.pricing.delivery_fee)
    .bind(order.pricing.tax)
    .bind(order.pricing.total)
    .bind(address.map(|a| &a.name))
    .bind(address.map(|a| &a.phone))
    .bind(address.map(|a| &a.address))
    .bind(address.map(|a| &a.city))
    .bind(address.map(|a| &a.state))
    .bind(address.map(|a| &a.postal_code))
    .bind(address.map(|a| &a.country))
    .bind(order.payment_method.to_string())
    .bind(payment.map(|p| &p.gateway_order_id))
    .bind(payment.map(|p| &p.gateway_payment_id))
    .bind(payment.map(|p| &p.signature))
    .bind(order.status.to_string())
    .fetch_one(conn)
    .await?;
    Ok(row)
}

pub(crate) async fn insert_order_items(
    order_id: &OrderId,
    items: &[CartLine],
    conn: &mut SqliteConnection,
) -> Result<(), StorageError> {
    for line in items {
        sqlx::query("INSERT INTO order_items (order_id, product_id, product_name, price, qty) VALUES ($1, $2, $3, $4, $5)")
            .bind(order_id)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(line.price)
            .bind(line.qty)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub(crate) async fn fetch_order_items(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<CartLine>, StorageError> {
    let items = sqlx::query_as("SELECT product_id, product_name, price, qty FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

async fn attach_items(rows: Vec<OrderRow>, conn: &mut SqliteConnection) -> Result<Vec<Order>, StorageError> {
    let mut orders = Vec::with_capacity(rows.len());
    for row in rows {
        let items = fetch_order_items(&row.order_id, &mut *conn).await?;
        orders.push(row.into_order(items));
    }
    Ok(orders)
}

pub(crate) async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StorageError> {
    let row: Option<OrderRow> =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id).fetch_optional(&mut *conn).await?;
    match row {
        Some(row) => {
            let items = fetch_order_items(&row.order_id, conn).await?;
            Ok(Some(row.into_order(items)))
        },
        None => Ok(None),
    }
}

/// All orders for the customer, most recent first. Insertion order breaks created-at ties, so
/// the listing stays stable for orders placed within the same second.
pub(crate) async fn fetch_orders_for_customer(
    customer_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, StorageError> {
    let rows: Vec<OrderRow> =
        sqlx::query_as("SELECT * FROM orders WHERE customer_id = $1 ORDER BY created_at DESC, id DESC")
            .bind(customer_id)
            .fetch_all(&mut *conn)
            .await?;
    attach_items(rows, conn).await
}

/// Fetches one page of the order book per the pagination parameters.
///
/// The page count is computed for the active status filter; pages outside `1..=total_pages`
/// return an empty page with the count intact.
pub(crate) async fn fetch_orders_paged(
    pagination: &OrderPagination,
    conn: &mut SqliteConnection,
) -> Result<OrderPage, StorageError> {
    let status = pagination.status.map(|s| s.to_string());
    let total: i64 = match &status {
        Some(status) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE status = $1")
                .bind(status)
                .fetch_one(&mut *conn)
                .await?
        },
        None => sqlx::query_scalar("SELECT COUNT(*) FROM orders").fetch_one(&mut *conn).await?,
    };
    let page_size = i64::from(pagination.page_size);
    let total_pages = u32::try_from((total + page_size - 1) / page_size).unwrap_or(u32::MAX);
    if pagination.page == 0 || pagination.page > total_pages {
        return Ok(OrderPage::empty(total_pages));
    }
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if let Some(status) = &status {
        builder.push("WHERE status = ");
        builder.push_bind(status);
    }
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(page_size);
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());
    trace!("📝️ Executing query: {}", builder.sql());
    let rows = builder.build_query_as::<OrderRow>().fetch_all(&mut *conn).await?;
    let orders = attach_items(rows, conn).await?;
    Ok(OrderPage { orders, total_pages })
}

/// Conditionally moves the order to a new status. The `WHERE` clause matches on the expected
/// current status, so concurrent transitions serialize here: the row is updated at most once and
/// the losing caller sees `None`.
pub(crate) async fn update_order_status(
    id: &OrderId,
    from: OrderStatus,
    to: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, StorageError> {
    let row: Option<OrderRow> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = $3 \
         RETURNING *",
    )
    .bind(to.to_string())
    .bind(id)
    .bind(from.to_string())
    .fetch_optional(&mut *conn)
    .await?;
    match row {
        Some(row) => {
            let items = fetch_order_items(&row.order_id, conn).await?;
            Ok(Some(row.into_order(items)))
        },
        None => Ok(None),
    }
}
