//! Load demo categories and products.
//!
//! Safe to run repeatedly: existing categories are reused and products whose
//! slug is already taken are skipped.

use anyhow::Context;
use catalog_core::error::{ConstraintViolation, CoreError};
use catalog_db::models::category::NewCategory;
use catalog_db::models::product::NewProduct;
use catalog_db::store::{CatalogStore, PgCatalogStore};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct DemoProduct {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    /// Price in cents.
    price: i64,
    category: &'static str,
    stock: i32,
}

const CATEGORIES: [(&str, &str); 2] = [("Electronics", "electronics"), ("Furniture", "furniture")];

const PRODUCTS: [DemoProduct; 5] = [
    DemoProduct {
        name: "MacBook Pro 16\"",
        slug: "macbook-pro-16",
        description: "Apple M3 Max chip, 36GB RAM, 1TB SSD. Perfect for developers and creative professionals.",
        price: 249_999,
        category: "Electronics",
        stock: 15,
    },
    DemoProduct {
        name: "Sony WH-1000XM5",
        slug: "sony-wh1000xm5",
        description: "Industry-leading noise canceling wireless headphones with premium sound quality.",
        price: 39_999,
        category: "Electronics",
        stock: 30,
    },
    DemoProduct {
        name: "iPhone 15 Pro",
        slug: "iphone-15-pro",
        description: "Titanium design, A17 Pro chip, advanced camera system with 5x telephoto.",
        price: 99_999,
        category: "Electronics",
        stock: 25,
    },
    DemoProduct {
        name: "Herman Miller Aeron Chair",
        slug: "herman-miller-aeron",
        description: "Ergonomic office chair with PostureFit support and adjustable features.",
        price: 139_500,
        category: "Furniture",
        stock: 8,
    },
    DemoProduct {
        name: "LG UltraWide Monitor 34\"",
        slug: "lg-ultrawide-34",
        description: "34-inch curved WQHD display with HDR10 support and USB-C connectivity.",
        price: 59_999,
        category: "Electronics",
        stock: 12,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_seed=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = catalog_db::create_pool(&database_url, 2)
        .await
        .context("Failed to connect to database")?;
    catalog_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let store = PgCatalogStore::new(pool.clone());

    for (name, slug) in CATEGORIES {
        let exists = store
            .list_categories()
            .await?
            .iter()
            .any(|c| c.slug == slug);
        if exists {
            tracing::info!(slug, "Category already present");
            continue;
        }
        store
            .create_category(&NewCategory {
                name: name.to_string(),
                slug: slug.to_string(),
            })
            .await
            .with_context(|| format!("Failed to create category {name}"))?;
        tracing::info!(slug, "Created category");
    }

    let categories = store.list_categories().await?;
    for demo in &PRODUCTS {
        let category_id = categories
            .iter()
            .find(|c| c.name == demo.category)
            .map(|c| c.id)
            .with_context(|| format!("Category {} is missing", demo.category))?;

        let input = NewProduct {
            name: demo.name.to_string(),
            slug: demo.slug.to_string(),
            description: Some(demo.description.to_string()),
            price: Decimal::new(demo.price, 2),
            stock: demo.stock,
            category_id,
            image_ref: None,
        };
        match store.create_product(&input).await {
            Ok(product) => tracing::info!(id = product.id, slug = demo.slug, "Created product"),
            Err(CoreError::Constraint(ConstraintViolation::DuplicateSlug { .. })) => {
                tracing::info!(slug = demo.slug, "Product already present");
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to create {}", demo.name)),
        }
    }

    pool.close().await;
    tracing::info!("Seeding complete");
    Ok(())
}
