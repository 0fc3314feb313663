use std::sync::Arc;

use crate::service::CatalogService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Catalog orchestration over the store and the asset store.
    pub catalog: Arc<CatalogService>,
}
