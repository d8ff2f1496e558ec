//! Create product command
//!
//! Command: pure data structure with validation. Handler: standalone async
//! function with the database operations inline.

use mediator::Request;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::validation::{
    validate_name, validate_sku, NameValidationError, SkuValidationError,
};
use crate::models::{normalize_sku, Product};

/// Command to create a new product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProductCommand {
    /// Stock keeping unit; unique case-insensitively
    pub sku: String,

    /// Display name of the product
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,

    #[serde(default)]
    pub quantity: i32,
}

/// Errors that can occur when creating a product
#[derive(Debug, thiserror::Error)]
pub enum CreateProductError {
    #[error("SKU validation failed: {0}")]
    SkuValidation(#[from] SkuValidationError),

    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("Product with SKU '{0}' already exists")]
    DuplicateSku(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Product, CreateProductError>> for CreateProductCommand {}

impl CreateProductCommand {
    /// Validates the command parameters
    pub fn validate(&self) -> Result<(), CreateProductError> {
        validate_sku(&self.sku, 255)?;
        validate_name(&self.name, 255)?;
        Ok(())
    }
}

/// Handler function for creating products
///
/// The SKU is normalized to uppercase before insert; a unique-constraint
/// violation maps to [`CreateProductError::DuplicateSku`].
#[tracing::instrument(skip(pool, command), fields(sku = %command.sku))]
pub async fn handle(
    pool: PgPool,
    command: CreateProductCommand,
) -> Result<Product, CreateProductError> {
    command.validate()?;

    let product = Product::new(
        &command.sku,
        command.name,
        command.description,
        command.price,
        command.quantity,
    );

    sqlx::query(
        r#"
        INSERT INTO products
            (id, sku, name, description, price, quantity, active, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(product.id)
    .bind(&product.sku)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.quantity)
    .bind(product.active)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return CreateProductError::DuplicateSku(normalize_sku(&command.sku));
            }
        }
        CreateProductError::Database(e)
    })?;

    tracing::info!(product_id = %product.id, sku = %product.sku, "Product created");

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(sku: &str, name: &str) -> CreateProductCommand {
        CreateProductCommand {
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            price: None,
            quantity: 0,
        }
    }

    #[test]
    fn test_validate_rejects_blank_sku() {
        assert!(matches!(
            command("  ", "Widget").validate(),
            Err(CreateProductError::SkuValidation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert!(matches!(
            command("WDG-1", "").validate(),
            Err(CreateProductError::NameValidation(_))
        ));
    }

    #[test]
    fn test_validate_accepts_minimal_command() {
        assert!(command("wdg-1", "Widget").validate().is_ok());
    }
}
