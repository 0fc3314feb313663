//! Postgres-backed [`CatalogStore`].

use async_trait::async_trait;
use catalog_core::error::{ConstraintViolation, CoreError};
use catalog_core::pagination::PageRequest;
use catalog_core::types::DbId;

use super::CatalogStore;
use crate::models::category::{Category, CategoryChanges, CategoryWithCount, NewCategory};
use crate::models::product::{NewProduct, Product, ProductChanges, ProductFilter, UpdatedProduct};
use crate::repositories::{CategoryRepo, ProductRepo};
use crate::DbPool;

/// PostgreSQL SQLSTATE codes we translate.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// Delegates to the repositories and classifies storage-native errors.
#[derive(Clone)]
pub struct PgCatalogStore {
    pool: DbPool,
}

impl PgCatalogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Translate a sqlx error into the domain taxonomy.
///
/// `on_foreign_key` says what a foreign key violation means for the
/// statement that failed: inserting or updating a product that points at a
/// missing category, or deleting a category that products still point at.
fn classify(err: sqlx::Error, on_foreign_key: ConstraintViolation) -> CoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        let constraint = db_err.constraint().unwrap_or("unknown");
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let violation = match constraint {
                    "uq_products_slug" => {
                        Some(ConstraintViolation::DuplicateSlug { entity: "product" })
                    }
                    "uq_categories_slug" => {
                        Some(ConstraintViolation::DuplicateSlug { entity: "category" })
                    }
                    "uq_categories_name" => {
                        Some(ConstraintViolation::DuplicateName { entity: "category" })
                    }
                    _ => None,
                };
                if let Some(violation) = violation {
                    return CoreError::Constraint(violation);
                }
            }
            Some(FOREIGN_KEY_VIOLATION) if constraint.starts_with("fk_") => {
                return CoreError::Constraint(on_foreign_key);
            }
            Some(CHECK_VIOLATION) => {
                return CoreError::Validation(format!("Value violates check constraint {constraint}"));
            }
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    CoreError::unavailable(err)
}

fn unavailable(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Database error");
    CoreError::unavailable(err)
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(unavailable)
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, CoreError> {
        CategoryRepo::list_with_counts(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn get_category(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        CategoryRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, CoreError> {
        CategoryRepo::create(&self.pool, input)
            .await
            .map_err(|e| classify(e, ConstraintViolation::CategoryInUse))
    }

    async fn update_category(
        &self,
        id: DbId,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, CoreError> {
        CategoryRepo::update(&self.pool, id, changes)
            .await
            .map_err(|e| classify(e, ConstraintViolation::CategoryInUse))
    }

    async fn delete_category(&self, id: DbId) -> Result<bool, CoreError> {
        CategoryRepo::delete(&self.pool, id)
            .await
            .map_err(|e| classify(e, ConstraintViolation::CategoryInUse))
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), CoreError> {
        let items = ProductRepo::list(&self.pool, filter, page)
            .await
            .map_err(unavailable)?;
        let total = ProductRepo::count(&self.pool, filter)
            .await
            .map_err(unavailable)?;
        Ok((items, total))
    }

    async fn list_products_in_category(
        &self,
        category_id: DbId,
    ) -> Result<Vec<Product>, CoreError> {
        ProductRepo::list_by_category(&self.pool, category_id)
            .await
            .map_err(unavailable)
    }

    async fn get_product(&self, id: DbId) -> Result<Option<Product>, CoreError> {
        ProductRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, CoreError> {
        ProductRepo::create(&self.pool, input)
            .await
            .map_err(|e| classify(e, ConstraintViolation::UnknownCategory))
    }

    async fn update_product(
        &self,
        id: DbId,
        changes: &ProductChanges,
    ) -> Result<Option<UpdatedProduct>, CoreError> {
        ProductRepo::update(&self.pool, id, changes)
            .await
            .map_err(|e| classify(e, ConstraintViolation::UnknownCategory))
    }

    async fn delete_product(&self, id: DbId) -> Result<Option<Product>, CoreError> {
        ProductRepo::delete(&self.pool, id)
            .await
            .map_err(unavailable)
    }
}
