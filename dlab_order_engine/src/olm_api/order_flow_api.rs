use std::fmt::Debug;

use log::*;

use crate::{
    cart,
    db_types::{DeliveryAddress, NewOrder, Order, OrderDraft, OrderId, OrderStatus, PaymentMethod},
    traits::{OrderDatabase, OrderManagement, ProductCatalog},
    OrderFlowError,
};

/// `OrderFlowApi` is the primary API for materializing orders and driving them through the
/// fulfillment state machine. It is stateless between requests; every call stands alone.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderFlowApi<B>
where B: OrderDatabase + OrderManagement + ProductCatalog
{
    /// Turn a draft into a durable order.
    ///
    /// The sequence is: validate the cart, validate the address, corroborate every unit price
    /// against the catalog, derive the price breakdown, check the payment proof matches the
    /// payment method, and only then persist. Any failure aborts before persistence; a partial
    /// order is never written.
    ///
    /// Gateway drafts must arrive with a payment reference produced by a successful signature
    /// verification. A client claiming "paid" without that proof is rejected — this method never
    /// trusts the claim itself.
    pub async fn place_order(&self, draft: OrderDraft) -> Result<Order, OrderFlowError> {
        let pricing = cart::price_cart(&draft.items)?;
        validate_address(draft.delivery_address.as_ref())?;
        for line in &draft.items {
            match self.db.product_price(&line.product_id).await? {
                Some(catalog_price) if catalog_price == line.price => {},
                Some(catalog_price) => {
                    debug!(
                        "🧾️ Price mismatch on product {}: catalog says {catalog_price}, client sent {}",
                        line.product_id, line.price
                    );
                    return Err(OrderFlowError::PriceMismatch { product_id: line.product_id.clone() });
                },
                None => {
                    debug!("🧾️ Unknown product {} in cart; cannot corroborate its price", line.product_id);
                    return Err(OrderFlowError::PriceMismatch { product_id: line.product_id.clone() });
                },
            }
        }
        let status = match (draft.payment_method, draft.payment.is_some()) {
            (PaymentMethod::Gateway, true) => OrderStatus::Paid,
            (PaymentMethod::Gateway, false) => return Err(OrderFlowError::PaymentProofMissing),
            (PaymentMethod::CashOnDelivery, false) => OrderStatus::Pending,
            (PaymentMethod::CashOnDelivery, true) => return Err(OrderFlowError::UnexpectedPaymentProof),
        };
        let new_order = NewOrder {
            order_id: OrderId::random(),
            customer_id: draft.customer_id,
            email: draft.email,
            items: draft.items,
            pricing,
            delivery_address: draft.delivery_address,
            payment_method: draft.payment_method,
            payment: draft.payment,
            status,
        };
        let order = self.db.insert_order(new_order).await?;
        info!(
            "🧾️ Order {} for customer {} persisted with status {} ({})",
            order.order_id, order.customer_id, order.status, order.pricing.total
        );
        Ok(order)
    }

    /// Apply a fulfillment transition to an order.
    ///
    /// Only `Pending -> Completed` and `Pending -> Cancelled` exist; any other request fails with
    /// [`OrderFlowError::InvalidTransition`] and leaves the order untouched. The storage update
    /// is conditional on the current status, so two racing transitions cannot both succeed — the
    /// loser observes `InvalidTransition` as well.
    ///
    /// Callers are responsible for role checks before invoking this.
    pub async fn update_status(&self, id: &OrderId, new_status: OrderStatus) -> Result<Order, OrderFlowError> {
        let order = self.db.fetch_order_by_id(id).await?.ok_or_else(|| OrderFlowError::OrderNotFound(id.clone()))?;
        if !order.status.can_transition_to(new_status) {
            debug!("🧾️ Rejecting status change {} -> {new_status} on order {id}", order.status);
            return Err(OrderFlowError::InvalidTransition { from: order.status, to: new_status });
        }
        match self.db.update_order_status(id, order.status, new_status).await? {
            Some(updated) => {
                info!("🧾️ Order {id} moved from {} to {}", order.status, updated.status);
                Ok(updated)
            },
            // The conditional update matched nothing: a concurrent transition won the race.
            None => {
                debug!("🧾️ Lost a status-change race on order {id}; the order is no longer {}", order.status);
                Err(OrderFlowError::InvalidTransition { from: order.status, to: new_status })
            },
        }
    }
}

fn validate_address(address: Option<&DeliveryAddress>) -> Result<(), OrderFlowError> {
    let address =
        address.ok_or_else(|| OrderFlowError::InvalidAddress("A delivery address is required".to_string()))?;
    let fields = [
        ("name", &address.name),
        ("phone", &address.phone),
        ("address", &address.address),
        ("city", &address.city),
        ("state", &address.state),
        ("postal code", &address.postal_code),
        ("country", &address.country),
    ];
    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(OrderFlowError::InvalidAddress(format!("The {label} field must not be blank")));
        }
    }
    if address.postal_code.len() != 6 || !address.postal_code.chars().all(|c| c.is_ascii_digit()) {
        return Err(OrderFlowError::InvalidAddress("The postal code must be a 6-digit PIN".to_string()));
    }
    Ok(())
}
