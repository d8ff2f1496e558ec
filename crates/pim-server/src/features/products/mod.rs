//! Product catalog feature
//!
//! CRUD operations for catalog products. Mutations emit `product_created`,
//! `product_updated`, and `product_deleted` webhook events fire-and-forget.

pub mod commands;
pub mod queries;
pub mod routes;

pub use routes::products_routes;
