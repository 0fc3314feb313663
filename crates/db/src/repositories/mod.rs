//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument and surface raw
//! `sqlx::Error`s; constraint classification happens in
//! [`PgCatalogStore`](crate::store::PgCatalogStore).

pub mod category_repo;
pub mod product_repo;

pub use category_repo::CategoryRepo;
pub use product_repo::ProductRepo;
