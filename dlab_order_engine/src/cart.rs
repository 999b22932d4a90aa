//! Cart pricing.
//!
//! Pure computation over a sequence of cart lines. No I/O, no shared state; callers on parallel
//! workers can price carts freely.

use dlab_common::Rupees;

use crate::{
    db_types::{CartLine, PriceBreakdown},
    OrderFlowError,
};

/// Flat delivery fee for orders at or below [`FREE_DELIVERY_THRESHOLD`].
pub const DELIVERY_FEE: Rupees = Rupees::from_rupees(50);
/// Subtotals *strictly above* this amount have the delivery fee waived. A subtotal of exactly
/// ₹500.00 still pays the fee.
pub const FREE_DELIVERY_THRESHOLD: Rupees = Rupees::from_rupees(500);
/// Flat tax rate, applied to the subtotal and rounded half-up to the paisa.
pub const TAX_RATE_PERCENT: i64 = 5;

/// Derive the price breakdown for a cart.
///
/// Every line must have a non-negative unit price and a quantity of at least one; otherwise the
/// whole cart is rejected with [`OrderFlowError::InvalidLineItem`]. An empty cart is likewise
/// rejected.
pub fn price_cart(lines: &[CartLine]) -> Result<PriceBreakdown, OrderFlowError> {
    if lines.is_empty() {
        return Err(OrderFlowError::InvalidLineItem("The cart contains no items".to_string()));
    }
    let mut subtotal = 0i64;
    for line in lines {
        validate_line(line)?;
        let line_total = line
            .price
            .value()
            .checked_mul(i64::from(line.qty))
            .and_then(|t| subtotal.checked_add(t))
            .ok_or_else(|| {
                OrderFlowError::InvalidLineItem(format!("Cart total overflows on product {}", line.product_id))
            })?;
        subtotal = line_total;
    }
    let subtotal = Rupees::from_paise(subtotal);
    let delivery_fee = if subtotal > FREE_DELIVERY_THRESHOLD { Rupees::default() } else { DELIVERY_FEE };
    let tax = subtotal.percent(TAX_RATE_PERCENT);
    let total = subtotal + delivery_fee + tax;
    Ok(PriceBreakdown { subtotal, delivery_fee, tax, total })
}

fn validate_line(line: &CartLine) -> Result<(), OrderFlowError> {
    if line.product_id.trim().is_empty() {
        return Err(OrderFlowError::InvalidLineItem("A cart line is missing its product id".to_string()));
    }
    if line.qty == 0 {
        return Err(OrderFlowError::InvalidLineItem(format!(
            "Product {} has quantity zero. Omit the line instead",
            line.product_id
        )));
    }
    if line.price.is_negative() {
        return Err(OrderFlowError::InvalidLineItem(format!(
            "Product {} has a negative unit price",
            line.product_id
        )));
    }
    Ok(())
}
