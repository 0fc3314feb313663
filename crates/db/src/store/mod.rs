//! The Catalog Repository contract.
//!
//! [`CatalogStore`] is what the service layer depends on. Every write
//! enforces the catalog invariants at the storage layer and reports
//! violations as [`CoreError::Constraint`], distinguishing duplicate keys
//! from unknown or still-referenced categories. I/O failures surface as
//! [`CoreError::Unavailable`].

mod memory;
mod postgres;

use async_trait::async_trait;
use catalog_core::error::CoreError;
use catalog_core::pagination::PageRequest;
use catalog_core::types::DbId;

use crate::models::category::{Category, CategoryChanges, CategoryWithCount, NewCategory};
use crate::models::product::{NewProduct, Product, ProductChanges, ProductFilter, UpdatedProduct};

pub use memory::MemoryCatalogStore;
pub use postgres::PgCatalogStore;

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> Result<(), CoreError>;

    // -- Categories ---------------------------------------------------------

    /// All categories ordered by name, each with its product count.
    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, CoreError>;

    async fn get_category(&self, id: DbId) -> Result<Option<Category>, CoreError>;

    /// Fails with `DuplicateName` / `DuplicateSlug` on collisions.
    async fn create_category(&self, input: &NewCategory) -> Result<Category, CoreError>;

    /// Returns `None` when the category does not exist.
    async fn update_category(
        &self,
        id: DbId,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, CoreError>;

    /// Returns `false` when the category does not exist. Fails with
    /// `CategoryInUse` while any product references it.
    async fn delete_category(&self, id: DbId) -> Result<bool, CoreError>;

    // -- Products -----------------------------------------------------------

    /// One page of matching products (newest first, ties by id descending)
    /// and the total number of matches across all pages.
    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), CoreError>;

    /// Every product of a category, newest first.
    async fn list_products_in_category(&self, category_id: DbId)
        -> Result<Vec<Product>, CoreError>;

    async fn get_product(&self, id: DbId) -> Result<Option<Product>, CoreError>;

    /// Fails with `DuplicateSlug` or `UnknownCategory`.
    async fn create_product(&self, input: &NewProduct) -> Result<Product, CoreError>;

    /// Returns `None` when the product does not exist. The previous image
    /// reference is read atomically with the write.
    async fn update_product(
        &self,
        id: DbId,
        changes: &ProductChanges,
    ) -> Result<Option<UpdatedProduct>, CoreError>;

    /// Removes the row and returns it, or `None` if it did not exist.
    async fn delete_product(&self, id: DbId) -> Result<Option<Product>, CoreError>;
}
