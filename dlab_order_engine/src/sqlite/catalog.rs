use dlab_common::Rupees;
use sqlx::SqliteConnection;

use crate::traits::StorageError;

pub(crate) async fn product_price(
    product_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Rupees>, StorageError> {
    let price: Option<Rupees> = sqlx::query_scalar("SELECT price FROM products WHERE product_id = $1")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(price)
}

pub(crate) async fn upsert_product(
    product_id: &str,
    product_name: &str,
    price: Rupees,
    conn: &mut SqliteConnection,
) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO products (product_id, product_name, price) VALUES ($1, $2, $3) \
         ON CONFLICT (product_id) DO UPDATE SET product_name = excluded.product_name, price = excluded.price",
    )
    .bind(product_id)
    .bind(product_name)
    .bind(price)
    .execute(conn)
    .await?;
    Ok(())
}
