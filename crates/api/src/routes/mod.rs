pub mod categories;
pub mod health;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                  list, create
/// /categories/{id}             get (with products), rename, delete
///
/// /products                    list (paginated, filtered), create (multipart)
/// /products/{id}               get (with category), update (multipart), delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/products", products::router())
}
