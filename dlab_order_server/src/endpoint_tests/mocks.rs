use dlab_common::Rupees;
use dlab_order_engine::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    order_objects::{OrderPage, OrderPagination},
    traits::{OrderDatabase, OrderManagement, ProductCatalog, StorageError},
};
use mockall::mock;

mock! {
    pub OrderStore {}
    impl OrderManagement for OrderStore {
        async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, StorageError>;
        async fn fetch_orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StorageError>;
        async fn fetch_orders_paged(&self, pagination: &OrderPagination) -> Result<OrderPage, StorageError>;
    }
    impl OrderDatabase for OrderStore {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, StorageError>;
        async fn update_order_status(&self, id: &OrderId, from: OrderStatus, to: OrderStatus) -> Result<Option<Order>, StorageError>;
    }
    impl ProductCatalog for OrderStore {
        async fn product_price(&self, product_id: &str) -> Result<Option<Rupees>, StorageError>;
    }
}
