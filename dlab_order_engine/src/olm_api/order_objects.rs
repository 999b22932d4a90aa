use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Upper bound on a single listing page, so a careless (or hostile) `limit` cannot drag the
/// whole order book into memory.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Parameters for the paged order listing. Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPagination {
    pub page: u32,
    pub page_size: u32,
    /// Restrict results to exactly this status. `None` returns all statuses.
    pub status: Option<OrderStatus>,
}

impl Default for OrderPagination {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE, status: None }
    }
}

impl OrderPagination {
    pub fn new(page: u32, page_size: u32, status: Option<OrderStatus>) -> Self {
        Self { page, page_size: page_size.clamp(1, MAX_PAGE_SIZE), status }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.page_size)
    }
}

impl Display for OrderPagination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {} ({} per page)", self.page, self.page_size)?;
        if let Some(status) = &self.status {
            write!(f, ", status {status}")?;
        }
        Ok(())
    }
}

/// One page of the order book plus the total number of pages for the active filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total_pages: u32,
}

impl OrderPage {
    pub fn empty(total_pages: u32) -> Self {
        Self { orders: Vec::new(), total_pages }
    }
}
