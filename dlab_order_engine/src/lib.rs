//! Dessert Lab Order Engine
//!
//! The order engine owns the hard part of the storefront: turning a client-supplied cart into a
//! durable, consistent order record and guarding the fulfillment state machine afterwards. It is
//! transport-agnostic; the HTTP server is a thin shell around the APIs exported here.
//!
//! The crate is divided into three main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You
//!    should never need to touch the database directly; go through the public APIs instead. The
//!    data types stored in the database are defined in [`mod@db_types`] and are public.
//! 2. The storage traits ([`mod@traits`]). A backend implements these to act as the order store
//!    and catalog lookup for the engine. Handlers stay generic over them, which is also what
//!    makes the endpoint tests cheap to mock.
//! 3. The engine public API: [`OrderFlowApi`] for mutations (order creation, status
//!    transitions) and [`OrderQueryApi`] for reads (single order, per-customer history, paged
//!    listings).
//!
//! Cart pricing lives in [`mod@cart`] and is pure computation, callable from anywhere.

pub mod cart;
pub mod db_types;

mod olm_api;
mod sqlite;
pub mod traits;

pub use olm_api::{
    errors::OrderFlowError,
    order_flow_api::OrderFlowApi,
    order_objects,
    order_query_api::OrderQueryApi,
};
pub use sqlite::SqliteDatabase;
