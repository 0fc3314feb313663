//! Catalog Service: orchestrates the catalog store and the asset store.
//!
//! Product writes follow a fixed order so that a product never points at a
//! missing image and no uploaded image outlives a failed write:
//!
//! 1. validate every field and resolve the category,
//! 2. `put` the new image (if any),
//! 3. commit the row,
//! 4. on success delete the superseded image, on failure delete the image
//!    uploaded in step 2.
//!
//! Cleanup deletes are attempted once. A failure is logged and never masks
//! the outcome of the write itself.

use std::sync::Arc;

use catalog_core::assets::{AssetRef, AssetStore};
use catalog_core::error::{ConstraintViolation, CoreError};
use catalog_core::pagination::{PageInfo, PageRequest};
use catalog_core::types::DbId;
use catalog_core::validation;
use catalog_db::models::category::{Category, CategoryChanges, CategoryWithCount, NewCategory};
use catalog_db::models::product::{NewProduct, Product, ProductChanges, ProductFilter};
use catalog_db::store::CatalogStore;
use serde::Serialize;
use validator::Validate;

/// An uploaded image as received from the client.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Raw product fields as decoded from a form.
///
/// Every value is still text; the service parses and validates it. `None`
/// means the field was not sent. For `description`, `Some("")` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub stock: Option<String>,
    pub category_id: Option<String>,
    pub image: Option<ImageUpload>,
}

/// Raw listing query values.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// A product as returned to clients: the row plus its resolved image location.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// A category with the products assigned to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<ProductView>,
}

/// One page of products plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub data: Vec<ProductView>,
    pub pagination: PageInfo,
}

pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    assets: Arc<dyn AssetStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, assets: Arc<dyn AssetStore>) -> Self {
        Self { store, assets }
    }

    /// Whether the catalog store is reachable.
    pub async fn is_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    // -- Categories ---------------------------------------------------------

    pub async fn list_categories(&self) -> Result<Vec<CategoryWithCount>, CoreError> {
        self.store.list_categories().await
    }

    pub async fn get_category(&self, id: DbId) -> Result<CategoryDetail, CoreError> {
        let category = self
            .store
            .get_category(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Category",
                id,
            })?;
        let products = self
            .store
            .list_products_in_category(id)
            .await?
            .into_iter()
            .map(|p| self.view(p, None))
            .collect();
        Ok(CategoryDetail { category, products })
    }

    pub async fn create_category(&self, input: NewCategory) -> Result<Category, CoreError> {
        input.validate().map_err(validation_failed)?;
        validation::validate_name("name", &input.name)?;
        validation::validate_slug(&input.slug)?;
        let category = self.store.create_category(&input).await?;
        tracing::info!(category_id = category.id, slug = %category.slug, "Category created");
        Ok(category)
    }

    pub async fn rename_category(
        &self,
        id: DbId,
        changes: CategoryChanges,
    ) -> Result<Category, CoreError> {
        changes.validate().map_err(validation_failed)?;
        if let Some(ref name) = changes.name {
            validation::validate_name("name", name)?;
        }
        if let Some(ref slug) = changes.slug {
            validation::validate_slug(slug)?;
        }
        if changes.is_empty() {
            return Err(CoreError::Validation(
                "at least one of name or slug is required".into(),
            ));
        }
        self.store
            .update_category(id, &changes)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Category",
                id,
            })
    }

    /// Returns `false` when there was nothing to delete.
    pub async fn delete_category(&self, id: DbId) -> Result<bool, CoreError> {
        let deleted = self.store.delete_category(id).await?;
        if deleted {
            tracing::info!(category_id = id, "Category deleted");
        }
        Ok(deleted)
    }

    // -- Products -----------------------------------------------------------

    pub async fn list_products(&self, query: ProductQuery) -> Result<ProductPage, CoreError> {
        let page = PageRequest::parse(query.page.as_deref(), query.limit.as_deref())?;
        let filter = parse_filter(&query)?;

        let (items, total) = self.store.list_products(&filter, page).await?;
        Ok(ProductPage {
            data: items.into_iter().map(|p| self.view(p, None)).collect(),
            pagination: PageInfo::new(page, total),
        })
    }

    pub async fn get_product(&self, id: DbId) -> Result<ProductView, CoreError> {
        let product = self.store.get_product(id).await?.ok_or(CoreError::NotFound {
            entity: "Product",
            id,
        })?;
        let category = self.store.get_category(product.category_id).await?;
        Ok(self.view(product, category))
    }

    pub async fn create_product(&self, form: ProductForm) -> Result<ProductView, CoreError> {
        let name = required("name", form.name.as_deref())?;
        validation::validate_name("name", name)?;
        let slug = required("slug", form.slug.as_deref())?;
        validation::validate_slug(slug)?;
        let price = validation::parse_price(required("price", form.price.as_deref())?)?;
        let stock = match present(form.stock.as_deref()) {
            Some(raw) => validation::parse_stock(raw)?,
            None => 0,
        };
        let category_id =
            validation::parse_id("categoryId", form.category_id.as_deref().unwrap_or(""))?;
        let category = self.require_category(category_id).await?;

        let uploaded = self.put_image(form.image.as_ref()).await?;

        let input = NewProduct {
            name: name.trim().to_string(),
            slug: slug.to_string(),
            description: form.description.filter(|d| !d.trim().is_empty()),
            price,
            stock,
            category_id,
            image_ref: uploaded.as_ref().map(|a| a.as_str().to_string()),
        };

        match self.store.create_product(&input).await {
            Ok(product) => {
                tracing::info!(product_id = product.id, slug = %product.slug, "Product created");
                Ok(self.view(product, Some(category)))
            }
            Err(err) => {
                if let Some(ref asset) = uploaded {
                    self.compensate(asset).await;
                }
                Err(err)
            }
        }
    }

    pub async fn update_product(
        &self,
        id: DbId,
        form: ProductForm,
    ) -> Result<ProductView, CoreError> {
        let mut changes = ProductChanges::default();
        if let Some(name) = present(form.name.as_deref()) {
            validation::validate_name("name", name)?;
            changes.name = Some(name.trim().to_string());
        }
        if let Some(slug) = present(form.slug.as_deref()) {
            validation::validate_slug(slug)?;
            changes.slug = Some(slug.to_string());
        }
        if let Some(description) = form.description {
            let description = description.trim();
            changes.description = Some((!description.is_empty()).then(|| description.to_string()));
        }
        if let Some(raw) = present(form.price.as_deref()) {
            changes.price = Some(validation::parse_price(raw)?);
        }
        if let Some(raw) = present(form.stock.as_deref()) {
            changes.stock = Some(validation::parse_stock(raw)?);
        }
        if let Some(raw) = present(form.category_id.as_deref()) {
            let category_id = validation::parse_id("categoryId", raw)?;
            self.require_category(category_id).await?;
            changes.category_id = Some(category_id);
        }

        if self.store.get_product(id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Product",
                id,
            });
        }

        let uploaded = self.put_image(form.image.as_ref()).await?;
        changes.image_ref = uploaded.as_ref().map(|a| a.as_str().to_string());

        let updated = match self.store.update_product(id, &changes).await {
            Ok(Some(updated)) => updated,
            Ok(None) => {
                if let Some(ref asset) = uploaded {
                    self.compensate(asset).await;
                }
                return Err(CoreError::NotFound {
                    entity: "Product",
                    id,
                });
            }
            Err(err) => {
                if let Some(ref asset) = uploaded {
                    self.compensate(asset).await;
                }
                return Err(err);
            }
        };

        if let Some(old) = updated.superseded_image_ref() {
            self.discard(old, "Superseded").await;
        }
        tracing::info!(product_id = id, "Product updated");

        // The write is durable at this point; a failed lookup only drops the
        // embedded category from the response.
        let category = match self.store.get_category(updated.product.category_id).await {
            Ok(category) => category,
            Err(e) => {
                tracing::warn!(
                    product_id = id,
                    error = %e,
                    "Category lookup after update failed"
                );
                None
            }
        };
        Ok(self.view(updated.product, category))
    }

    /// Delete a product and then its image.
    ///
    /// Returns `false` when the product did not exist; no asset is touched
    /// in that case.
    pub async fn delete_product(&self, id: DbId) -> Result<bool, CoreError> {
        let Some(removed) = self.store.delete_product(id).await? else {
            return Ok(false);
        };
        if let Some(ref image_ref) = removed.image_ref {
            self.discard(image_ref, "Orphaned").await;
        }
        tracing::info!(product_id = id, "Product deleted");
        Ok(true)
    }

    // -- Helpers ------------------------------------------------------------

    async fn require_category(&self, id: DbId) -> Result<Category, CoreError> {
        self.store
            .get_category(id)
            .await?
            .ok_or(CoreError::Constraint(ConstraintViolation::UnknownCategory))
    }

    async fn put_image(&self, image: Option<&ImageUpload>) -> Result<Option<AssetRef>, CoreError> {
        match image {
            Some(image) if !image.data.is_empty() => {
                let asset = self
                    .assets
                    .put(&image.data, image.content_type.as_deref())
                    .await?;
                Ok(Some(asset))
            }
            _ => Ok(None),
        }
    }

    /// Remove an asset uploaded by a write that then failed.
    async fn compensate(&self, asset: &AssetRef) {
        tracing::info!(asset = %asset, "Removing asset of failed write");
        if let Err(e) = self.assets.delete(asset).await {
            tracing::warn!(asset = %asset, error = %e, "Compensating asset delete failed");
        }
    }

    /// Remove an asset no product refers to anymore.
    async fn discard(&self, image_ref: &str, reason: &'static str) {
        let asset = match AssetRef::parse(image_ref) {
            Ok(asset) => asset,
            Err(e) => {
                tracing::warn!(image_ref, error = %e, "Skipping cleanup of unparseable asset reference");
                return;
            }
        };
        if let Err(e) = self.assets.delete(&asset).await {
            tracing::warn!(asset = %asset, reason, error = %e, "Asset cleanup failed");
        }
    }

    fn view(&self, product: Product, category: Option<Category>) -> ProductView {
        let image_url = product
            .image_ref
            .as_deref()
            .and_then(|r| AssetRef::parse(r).ok())
            .map(|asset| self.assets.resolve(&asset));
        ProductView {
            product,
            image_url,
            category,
        }
    }
}

fn validation_failed(errors: validator::ValidationErrors) -> CoreError {
    CoreError::Validation(errors.to_string())
}

/// Treat blank text fields as absent.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|v| !v.trim().is_empty())
}

fn required<'a>(field: &str, raw: Option<&'a str>) -> Result<&'a str, CoreError> {
    present(raw).ok_or_else(|| CoreError::Validation(format!("{field} is required")))
}

fn parse_filter(query: &ProductQuery) -> Result<ProductFilter, CoreError> {
    let search = present(query.search.as_deref()).map(|s| s.trim().to_string());
    let category_id = present(query.category_id.as_deref())
        .map(|raw| validation::parse_id("categoryId", raw))
        .transpose()?;
    let min_price = present(query.min_price.as_deref())
        .map(|raw| validation::parse_price_bound("minPrice", raw))
        .transpose()?;
    let max_price = present(query.max_price.as_deref())
        .map(|raw| validation::parse_price_bound("maxPrice", raw))
        .transpose()?;

    if let (Some(min), Some(max)) = (min_price, max_price) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "minPrice ({min}) must not exceed maxPrice ({max})"
            )));
        }
    }

    Ok(ProductFilter {
        search,
        category_id,
        min_price,
        max_price,
    })
}
