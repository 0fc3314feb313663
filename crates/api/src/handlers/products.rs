//! Handlers for the `/products` resource.
//!
//! Writes take `multipart/form-data` so an image can travel with the fields.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::multipart::read_product_form;
use crate::query::ProductListParams;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/products?page&limit&search&categoryId&minPrice&maxPrice
///
/// Newest first. Responds with `{ data, pagination }`.
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ProductListParams>, QueryRejection>,
) -> AppResult<impl IntoResponse> {
    let Query(params) = params?;
    let page = state.catalog.list_products(params.into()).await?;
    Ok(Json(page))
}

/// GET /api/products/{id}
///
/// Get a product with its category.
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    let product = state.catalog.get_product(id).await?;
    Ok(Json(DataResponse { data: product }))
}

/// POST /api/products
///
/// Fields: `name`, `slug`, `price`, `categoryId`, optional `description`,
/// `stock` and `image`.
pub async fn create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let form = read_product_form(multipart?).await?;
    let product = state.catalog.create_product(form).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: product })))
}

/// PUT /api/products/{id}
///
/// Partial update; a new `image` replaces the current one.
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    let form = read_product_form(multipart?).await?;
    let product = state.catalog.update_product(id, form).await?;
    Ok(Json(DataResponse { data: product }))
}

/// DELETE /api/products/{id}
///
/// Removes the product and its image.
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    if state.catalog.delete_product(id).await? {
        Ok(Json(MessageResponse::new("Product deleted successfully")))
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Product",
            id,
        }))
    }
}
