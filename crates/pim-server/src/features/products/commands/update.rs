//! Update product command
//!
//! Partial update: only the provided fields change. The SKU is immutable
//! after creation; re-keying is done by delete and re-create.

use mediator::Request;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::features::shared::validation::{validate_name, NameValidationError};
use crate::models::Product;

/// Command to update an existing product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProductCommand {
    /// Set from the path parameter, not the body
    #[serde(skip)]
    pub id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// `Some(None)` clears the description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,

    /// `Some(None)` clears the price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Option<Decimal>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Errors that can occur when updating a product
#[derive(Debug, thiserror::Error)]
pub enum UpdateProductError {
    #[error("Name validation failed: {0}")]
    NameValidation(#[from] NameValidationError),

    #[error("No fields to update")]
    NoFieldsToUpdate,

    #[error("Product '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<Product, UpdateProductError>> for UpdateProductCommand {}

impl UpdateProductCommand {
    /// Validates the command parameters
    pub fn validate(&self) -> Result<(), UpdateProductError> {
        if self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.active.is_none()
        {
            return Err(UpdateProductError::NoFieldsToUpdate);
        }
        if let Some(ref name) = self.name {
            validate_name(name, 255)?;
        }
        Ok(())
    }
}

/// Handler function for updating products
#[tracing::instrument(skip(pool, command), fields(product_id = %command.id))]
pub async fn handle(
    pool: PgPool,
    command: UpdateProductCommand,
) -> Result<Product, UpdateProductError> {
    command.validate()?;

    let mut product = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, sku, name, description, price, quantity, active, created_at, updated_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(command.id)
    .fetch_optional(&pool)
    .await?
    .ok_or(UpdateProductError::NotFound(command.id))?;

    if let Some(name) = command.name {
        product.name = name;
    }
    if let Some(description) = command.description {
        product.description = description;
    }
    if let Some(price) = command.price {
        product.price = price;
    }
    if let Some(quantity) = command.quantity {
        product.quantity = quantity;
    }
    if let Some(active) = command.active {
        product.active = active;
    }
    product.updated_at = chrono::Utc::now();

    sqlx::query(
        r#"
        UPDATE products
        SET name = $2, description = $3, price = $4, quantity = $5, active = $6,
            updated_at = $7
        WHERE id = $1
        "#,
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(product.quantity)
    .bind(product.active)
    .bind(product.updated_at)
    .execute(&pool)
    .await?;

    tracing::info!(product_id = %product.id, "Product updated");

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_update() {
        let command = UpdateProductCommand {
            id: Uuid::new_v4(),
            name: None,
            description: None,
            price: None,
            quantity: None,
            active: None,
        };
        assert!(matches!(
            command.validate(),
            Err(UpdateProductError::NoFieldsToUpdate)
        ));
    }

    #[test]
    fn test_validate_accepts_single_field() {
        let command = UpdateProductCommand {
            id: Uuid::new_v4(),
            name: None,
            description: None,
            price: None,
            quantity: Some(5),
            active: None,
        };
        assert!(command.validate().is_ok());
    }
}
