//! In-process [`CatalogStore`] enforcing the same constraints as the schema.
//!
//! All state sits behind one async mutex, so every operation is atomic with
//! respect to the others, mirroring the row locks and constraint checks the
//! database performs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use catalog_core::error::{ConstraintViolation, CoreError};
use catalog_core::pagination::PageRequest;
use catalog_core::types::DbId;
use tokio::sync::Mutex;

use super::CatalogStore;
use crate::models::category::{Category, CategoryChanges, CategoryWithCount, NewCategory};
use crate::models::product::{NewProduct, Product, ProductChanges, ProductFilter, UpdatedProduct};

#[derive(Default)]
struct State {
    categories: BTreeMap<DbId, Category>,
    products: BTreeMap<DbId, Product>,
    last_category_id: DbId,
    last_product_id: DbId,
}

impl State {
    fn check_category_unique(
        &self,
        except: Option<DbId>,
        name: Option<&str>,
        slug: Option<&str>,
    ) -> Result<(), CoreError> {
        for category in self.categories.values() {
            if Some(category.id) == except {
                continue;
            }
            if name.is_some_and(|n| n == category.name) {
                return Err(ConstraintViolation::DuplicateName { entity: "category" }.into());
            }
            if slug.is_some_and(|s| s == category.slug) {
                return Err(ConstraintViolation::DuplicateSlug { entity: "category" }.into());
            }
        }
        Ok(())
    }

    fn check_product_slug_unique(&self, except: Option<DbId>, slug: &str) -> Result<(), CoreError> {
        let taken = self
            .products
            .values()
            .any(|p| Some(p.id) != except && p.slug == slug);
        if taken {
            return Err(ConstraintViolation::DuplicateSlug { entity: "product" }.into());
        }
        Ok(())
    }

    fn check_category_exists(&self, category_id: DbId) -> Result<(), CoreError> {
        if self.categories.contains_key(&category_id) {
            Ok(())
        } else {
            Err(ConstraintViolation::UnknownCategory.into())
        }
    }

    /// Products matching `filter`, newest first with id as tie-break.
    fn sorted_matches(&self, filter: &ProductFilter) -> Vec<&Product> {
        let mut matches: Vec<&Product> = self
            .products
            .values()
            .filter(|p| filter.matches(p))
            .collect();
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        matches
    }
}

/// A [`CatalogStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryCatalogStore {
    state: Mutex<State>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, CoreError> {
        let state = self.state.lock().await;
        let mut categories: Vec<CategoryWithCount> = state
            .categories
            .values()
            .map(|c| CategoryWithCount {
                id: c.id,
                name: c.name.clone(),
                slug: c.slug.clone(),
                created_at: c.created_at,
                product_count: state
                    .products
                    .values()
                    .filter(|p| p.category_id == c.id)
                    .count() as i64,
            })
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: DbId) -> Result<Option<Category>, CoreError> {
        Ok(self.state.lock().await.categories.get(&id).cloned())
    }

    async fn create_category(&self, input: &NewCategory) -> Result<Category, CoreError> {
        let mut state = self.state.lock().await;
        let name = input.name.trim();
        state.check_category_unique(None, Some(name), Some(&input.slug))?;

        state.last_category_id += 1;
        let category = Category {
            id: state.last_category_id,
            name: name.to_string(),
            slug: input.slug.clone(),
            created_at: chrono::Utc::now(),
        };
        state.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: DbId,
        changes: &CategoryChanges,
    ) -> Result<Option<Category>, CoreError> {
        let mut state = self.state.lock().await;
        if !state.categories.contains_key(&id) {
            return Ok(None);
        }
        let name = changes.name.as_deref().map(str::trim);
        state.check_category_unique(Some(id), name, changes.slug.as_deref())?;

        let Some(category) = state.categories.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = name {
            category.name = name.to_string();
        }
        if let Some(ref slug) = changes.slug {
            category.slug = slug.clone();
        }
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: DbId) -> Result<bool, CoreError> {
        let mut state = self.state.lock().await;
        if !state.categories.contains_key(&id) {
            return Ok(false);
        }
        if state.products.values().any(|p| p.category_id == id) {
            return Err(ConstraintViolation::CategoryInUse.into());
        }
        state.categories.remove(&id);
        Ok(true)
    }

    async fn list_products(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<(Vec<Product>, i64), CoreError> {
        let state = self.state.lock().await;
        let matches = state.sorted_matches(filter);
        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(0))
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn list_products_in_category(
        &self,
        category_id: DbId,
    ) -> Result<Vec<Product>, CoreError> {
        let state = self.state.lock().await;
        let filter = ProductFilter {
            category_id: Some(category_id),
            ..Default::default()
        };
        Ok(state.sorted_matches(&filter).into_iter().cloned().collect())
    }

    async fn get_product(&self, id: DbId) -> Result<Option<Product>, CoreError> {
        Ok(self.state.lock().await.products.get(&id).cloned())
    }

    async fn create_product(&self, input: &NewProduct) -> Result<Product, CoreError> {
        let mut state = self.state.lock().await;
        state.check_product_slug_unique(None, &input.slug)?;
        state.check_category_exists(input.category_id)?;

        state.last_product_id += 1;
        let now = chrono::Utc::now();
        let product = Product {
            id: state.last_product_id,
            name: input.name.trim().to_string(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            price: input.price,
            stock: input.stock,
            category_id: input.category_id,
            image_ref: input.image_ref.clone(),
            created_at: now,
            updated_at: now,
        };
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: DbId,
        changes: &ProductChanges,
    ) -> Result<Option<UpdatedProduct>, CoreError> {
        let mut state = self.state.lock().await;
        if !state.products.contains_key(&id) {
            return Ok(None);
        }
        if let Some(ref slug) = changes.slug {
            state.check_product_slug_unique(Some(id), slug)?;
        }
        if let Some(category_id) = changes.category_id {
            state.check_category_exists(category_id)?;
        }

        let Some(product) = state.products.get_mut(&id) else {
            return Ok(None);
        };
        let previous_image_ref = product.image_ref.clone();
        if let Some(ref name) = changes.name {
            product.name = name.trim().to_string();
        }
        if let Some(ref slug) = changes.slug {
            product.slug = slug.clone();
        }
        if let Some(ref description) = changes.description {
            product.description = description.clone();
        }
        if let Some(price) = changes.price {
            product.price = price;
        }
        if let Some(stock) = changes.stock {
            product.stock = stock;
        }
        if let Some(category_id) = changes.category_id {
            product.category_id = category_id;
        }
        if let Some(ref image_ref) = changes.image_ref {
            product.image_ref = Some(image_ref.clone());
        }
        product.updated_at = chrono::Utc::now();

        Ok(Some(UpdatedProduct {
            product: product.clone(),
            previous_image_ref,
        }))
    }

    async fn delete_product(&self, id: DbId) -> Result<Option<Product>, CoreError> {
        Ok(self.state.lock().await.products.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;

    use super::*;

    fn new_category(name: &str, slug: &str) -> NewCategory {
        NewCategory {
            name: name.into(),
            slug: slug.into(),
        }
    }

    fn new_product(slug: &str, category_id: DbId) -> NewProduct {
        NewProduct {
            name: slug.to_uppercase(),
            slug: slug.into(),
            description: None,
            price: Decimal::new(1000, 2),
            stock: 0,
            category_id,
            image_ref: None,
        }
    }

    #[tokio::test]
    async fn category_names_and_slugs_are_unique() {
        let store = MemoryCatalogStore::new();
        store
            .create_category(&new_category("Electronics", "electronics"))
            .await
            .unwrap();

        assert_matches!(
            store.create_category(&new_category("Electronics", "other")).await,
            Err(CoreError::Constraint(ConstraintViolation::DuplicateName { .. }))
        );
        assert_matches!(
            store.create_category(&new_category("Other", "electronics")).await,
            Err(CoreError::Constraint(ConstraintViolation::DuplicateSlug { .. }))
        );
    }

    #[tokio::test]
    async fn rename_to_own_values_is_allowed() {
        let store = MemoryCatalogStore::new();
        let cat = store
            .create_category(&new_category("Electronics", "electronics"))
            .await
            .unwrap();
        let changes = CategoryChanges {
            name: Some("Electronics".into()),
            slug: Some("gadgets".into()),
        };
        let renamed = store.update_category(cat.id, &changes).await.unwrap().unwrap();
        assert_eq!(renamed.slug, "gadgets");
    }

    #[tokio::test]
    async fn product_writes_check_slug_and_category() {
        let store = MemoryCatalogStore::new();
        let cat = store
            .create_category(&new_category("Electronics", "electronics"))
            .await
            .unwrap();
        store.create_product(&new_product("phone", cat.id)).await.unwrap();

        assert_matches!(
            store.create_product(&new_product("phone", cat.id)).await,
            Err(CoreError::Constraint(ConstraintViolation::DuplicateSlug { .. }))
        );
        assert_matches!(
            store.create_product(&new_product("tablet", 99)).await,
            Err(CoreError::Constraint(ConstraintViolation::UnknownCategory))
        );
    }

    #[tokio::test]
    async fn category_delete_is_restricted_while_referenced() {
        let store = MemoryCatalogStore::new();
        let cat = store
            .create_category(&new_category("Electronics", "electronics"))
            .await
            .unwrap();
        let product = store.create_product(&new_product("phone", cat.id)).await.unwrap();

        assert_matches!(
            store.delete_category(cat.id).await,
            Err(CoreError::Constraint(ConstraintViolation::CategoryInUse))
        );
        store.delete_product(product.id).await.unwrap();
        assert!(store.delete_category(cat.id).await.unwrap());
        assert!(!store.delete_category(cat.id).await.unwrap());
    }

    #[tokio::test]
    async fn listing_is_newest_first_with_total() {
        let store = MemoryCatalogStore::new();
        let cat = store
            .create_category(&new_category("Electronics", "electronics"))
            .await
            .unwrap();
        for slug in ["a", "b", "c"] {
            store.create_product(&new_product(slug, cat.id)).await.unwrap();
        }

        let page = PageRequest::new(1, 2).unwrap();
        let (items, total) = store
            .list_products(&ProductFilter::default(), page)
            .await
            .unwrap();
        assert_eq!(total, 3);
        let slugs: Vec<_> = items.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, ["c", "b"]);
    }

    #[tokio::test]
    async fn update_reports_previous_image() {
        let store = MemoryCatalogStore::new();
        let cat = store
            .create_category(&new_category("Electronics", "electronics"))
            .await
            .unwrap();
        let mut input = new_product("phone", cat.id);
        input.image_ref = Some("old.png".into());
        let product = store.create_product(&input).await.unwrap();

        let changes = ProductChanges {
            image_ref: Some("new.png".into()),
            description: Some(Some("Shiny".into())),
            ..Default::default()
        };
        let updated = store.update_product(product.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.previous_image_ref.as_deref(), Some("old.png"));
        assert_eq!(updated.product.image_ref.as_deref(), Some("new.png"));
        assert_eq!(updated.product.description.as_deref(), Some("Shiny"));
        assert!(updated.product.updated_at >= product.updated_at);

        assert!(store.update_product(999, &changes).await.unwrap().is_none());
    }
}
