//! Handlers for the `/categories` resource.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::types::DbId;
use catalog_db::models::category::{CategoryChanges, NewCategory};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// GET /api/categories
///
/// List all categories with their product counts.
pub async fn list(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(DataResponse { data: categories }))
}

/// GET /api/categories/{id}
///
/// Get a category with its products.
pub async fn get_by_id(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    let category = state.catalog.get_category(id).await?;
    Ok(Json(DataResponse { data: category }))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    input: Result<Json<NewCategory>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let category = state.catalog.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/categories/{id}
///
/// Rename a category. Absent fields are left unchanged.
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
    input: Result<Json<CategoryChanges>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    let Json(input) = input?;
    let category = state.catalog.rename_category(id, input).await?;
    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/categories/{id}
///
/// Refused with 409 while any product is assigned to the category.
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<DbId>, PathRejection>,
) -> AppResult<impl IntoResponse> {
    let Path(id) = path?;
    if state.catalog.delete_category(id).await? {
        Ok(Json(MessageResponse::new("Category deleted successfully")))
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id,
        }))
    }
}
