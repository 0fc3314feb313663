//! Product entity model, DTOs, and listing filter.

use catalog_core::types::{DbId, Price, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `products` table.
///
/// `image_ref` is the asset store reference of the product picture; clients
/// see the resolved location instead, so it is not serialized.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: i32,
    pub category_id: DbId,
    #[serde(skip_serializing)]
    pub image_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a product. Built by the service after validation.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: i32,
    pub category_id: DbId,
    pub image_ref: Option<String>,
}

/// DTO for a partial product update. `None` leaves a column unchanged.
///
/// `description` is doubly optional: `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
    pub category_id: Option<DbId>,
    pub image_ref: Option<String>,
}

/// Result of an update: the new row and the image reference it held before.
#[derive(Debug, Clone)]
pub struct UpdatedProduct {
    pub product: Product,
    pub previous_image_ref: Option<String>,
}

impl UpdatedProduct {
    /// The reference this update replaced, if the image changed.
    pub fn superseded_image_ref(&self) -> Option<&str> {
        match (&self.previous_image_ref, &self.product.image_ref) {
            (Some(old), Some(new)) if old == new => None,
            (Some(old), _) => Some(old.as_str()),
            (None, _) => None,
        }
    }
}

/// Filters for product listings. All present options are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against name OR description.
    pub search: Option<String>,
    pub category_id: Option<DbId>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
}

impl ProductFilter {
    /// Whether `product` satisfies every present option.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(term) = self.search.as_deref() {
            let term = term.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&term);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&term));
            if !in_name && !in_description {
                return false;
            }
        }
        if self.category_id.is_some_and(|id| id != product.category_id) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn product(name: &str, description: Option<&str>, price: i64, category_id: DbId) -> Product {
        let now = chrono::Utc::now();
        Product {
            id: 1,
            name: name.into(),
            slug: "p".into(),
            description: description.map(Into::into),
            price: Decimal::new(price, 0),
            stock: 0,
            category_id,
            image_ref: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn search_is_case_insensitive_over_name_or_description() {
        let mac = product("MacBook Pro", Some("Apple laptop"), 2499, 1);
        for term in ["macbook", "MACBOOK", "book", "APPLE"] {
            let filter = ProductFilter {
                search: Some(term.into()),
                ..Default::default()
            };
            assert!(filter.matches(&mac), "{term} should match");
        }
        let filter = ProductFilter {
            search: Some("chair".into()),
            ..Default::default()
        };
        assert!(!filter.matches(&mac));
    }

    #[test]
    fn price_bounds_are_inclusive_and_anded_with_category() {
        let phone = product("Phone", None, 999, 1);
        let filter = ProductFilter {
            category_id: Some(1),
            min_price: Some(Decimal::new(999, 0)),
            max_price: Some(Decimal::new(999, 0)),
            ..Default::default()
        };
        assert!(filter.matches(&phone));
        let other_category = ProductFilter {
            category_id: Some(2),
            ..filter.clone()
        };
        assert!(!other_category.matches(&phone));
    }

    #[test]
    fn superseded_only_when_image_changed() {
        let mut updated = UpdatedProduct {
            product: product("Phone", None, 1, 1),
            previous_image_ref: Some("a.png".into()),
        };
        updated.product.image_ref = Some("b.png".into());
        assert_eq!(updated.superseded_image_ref(), Some("a.png"));

        updated.product.image_ref = Some("a.png".into());
        assert_eq!(updated.superseded_image_ref(), None);

        updated.previous_image_ref = None;
        assert_eq!(updated.superseded_image_ref(), None);
    }
}
