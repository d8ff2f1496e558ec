//! Product write operations

pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateProductCommand, CreateProductError};
pub use delete::{
    DeleteAllProductsCommand, DeleteAllProductsError, DeleteProductCommand, DeleteProductError,
};
pub use update::{UpdateProductCommand, UpdateProductError};
