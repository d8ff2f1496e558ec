//! Product API routes
//!
//! Wires the product commands and queries to Axum handlers.
//!
//! # Route Structure
//!
//! - `POST /api/v1/products` - Create a product
//! - `GET /api/v1/products` - List products with filters and pagination
//! - `DELETE /api/v1/products` - Delete every product
//! - `GET /api/v1/products/:id` - Get a single product
//! - `PUT /api/v1/products/:id` - Update a product
//! - `DELETE /api/v1/products/:id` - Delete a product

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse, PaginationMeta};
use crate::features::FeatureState;
use crate::models::EventType;

use super::commands::{
    CreateProductCommand, CreateProductError, DeleteAllProductsCommand, DeleteAllProductsError,
    DeleteProductCommand, DeleteProductError, UpdateProductCommand, UpdateProductError,
};
use super::queries::{GetProductError, GetProductQuery, ListProductsError, ListProductsQuery};

// ============================================================================
// Router Configuration
// ============================================================================

/// Creates the products router with all routes configured
pub fn products_routes(state: FeatureState) -> Router<()> {
    Router::new()
        .route("/", get(list_products).post(create_product).delete(delete_all_products))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .with_state(state)
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Create a new product
///
/// `POST /api/v1/products`
///
/// - `201 Created` - Product created
/// - `400 Bad Request` - Validation error
/// - `409 Conflict` - SKU already exists (case-insensitive)
#[tracing::instrument(skip(state, command), fields(sku = %command.sku))]
async fn create_product(
    State(state): State<FeatureState>,
    Json(command): Json<CreateProductCommand>,
) -> Result<Response, ProductApiError> {
    let product = super::commands::create::handle(state.db.clone(), command).await?;

    state
        .dispatcher
        .dispatch(EventType::ProductCreated, json!(product));

    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))).into_response())
}

/// Update an existing product
///
/// `PUT /api/v1/products/:id`
///
/// - `200 OK` - Product updated
/// - `400 Bad Request` - Validation error
/// - `404 Not Found` - Unknown product id
#[tracing::instrument(skip(state, command), fields(product_id = %id))]
async fn update_product(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
    Json(mut command): Json<UpdateProductCommand>,
) -> Result<Response, ProductApiError> {
    command.id = id;

    let product = super::commands::update::handle(state.db.clone(), command).await?;

    state
        .dispatcher
        .dispatch(EventType::ProductUpdated, json!(product));

    Ok((StatusCode::OK, Json(ApiResponse::success(product))).into_response())
}

/// Delete a product
///
/// `DELETE /api/v1/products/:id`
///
/// - `200 OK` - Product deleted
/// - `404 Not Found` - Unknown product id
#[tracing::instrument(skip(state), fields(product_id = %id))]
async fn delete_product(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ProductApiError> {
    let deleted = super::commands::delete::handle(state.db.clone(), DeleteProductCommand { id })
        .await?;

    state.dispatcher.dispatch(
        EventType::ProductDeleted,
        json!({"product_id": deleted.id, "sku": deleted.sku}),
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(deleted))).into_response())
}

/// Delete every product in the catalog
///
/// `DELETE /api/v1/products`
#[tracing::instrument(skip(state))]
async fn delete_all_products(
    State(state): State<FeatureState>,
) -> Result<Response, ProductApiError> {
    let response =
        super::commands::delete::handle_all(state.db.clone(), DeleteAllProductsCommand {}).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Get a single product
///
/// `GET /api/v1/products/:id`
#[tracing::instrument(skip(state), fields(product_id = %id))]
async fn get_product(
    State(state): State<FeatureState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ProductApiError> {
    let product = super::queries::get::handle(state.db.clone(), GetProductQuery { id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(product))).into_response())
}

/// List products with filters and pagination
///
/// `GET /api/v1/products?sku=&name=&active=&page=&per_page=`
#[tracing::instrument(skip(state, query))]
async fn list_products(
    State(state): State<FeatureState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Response, ProductApiError> {
    let page = query.pagination().page();
    let per_page = query.pagination().per_page();

    let response = super::queries::list::handle(state.db.clone(), query).await?;
    let meta = PaginationMeta::new(page, per_page, response.total);

    Ok((
        StatusCode::OK,
        Json(ApiResponse::success_with_meta(
            response.products,
            json!(meta),
        )),
    )
        .into_response())
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Aggregates product operation errors for HTTP mapping
#[derive(Debug, thiserror::Error)]
enum ProductApiError {
    #[error(transparent)]
    Create(#[from] CreateProductError),
    #[error(transparent)]
    Update(#[from] UpdateProductError),
    #[error(transparent)]
    Delete(#[from] DeleteProductError),
    #[error(transparent)]
    DeleteAll(#[from] DeleteAllProductsError),
    #[error(transparent)]
    Get(#[from] GetProductError),
    #[error(transparent)]
    List(#[from] ListProductsError),
}

impl IntoResponse for ProductApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ProductApiError::Create(CreateProductError::SkuValidation(_))
            | ProductApiError::Create(CreateProductError::NameValidation(_))
            | ProductApiError::Update(UpdateProductError::NameValidation(_))
            | ProductApiError::Update(UpdateProductError::NoFieldsToUpdate) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            ProductApiError::Create(CreateProductError::DuplicateSku(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            ProductApiError::Update(UpdateProductError::NotFound(_))
            | ProductApiError::Delete(DeleteProductError::NotFound(_))
            | ProductApiError::Get(GetProductError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ProductApiError::Create(CreateProductError::Database(_))
            | ProductApiError::Update(UpdateProductError::Database(_))
            | ProductApiError::Delete(DeleteProductError::Database(_))
            | ProductApiError::DeleteAll(DeleteAllProductsError::Database(_))
            | ProductApiError::Get(GetProductError::Database(_))
            | ProductApiError::List(ListProductsError::Database(_)) => {
                tracing::error!("Database error in product API: {}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "A database error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
