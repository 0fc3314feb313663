//! Repository for the `products` table.

use catalog_core::pagination::PageRequest;
use catalog_core::types::DbId;
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgPool, Postgres};

use crate::models::product::{NewProduct, Product, ProductChanges, ProductFilter, UpdatedProduct};

/// Column list for the `products` table.
const COLUMNS: &str = "id, name, slug, description, price, stock, category_id, image_ref, \
    created_at, updated_at";

/// Newest first; `id` breaks ties between rows created in the same instant.
const ORDER_BY: &str = "ORDER BY created_at DESC, id DESC";

/// Provides CRUD and filtered listing for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product.
    pub async fn create(pool: &PgPool, input: &NewProduct) -> Result<Product, sqlx::Error> {
        let query = format!(
            "INSERT INTO products \
                (name, slug, description, price, stock, category_id, image_ref) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(input.name.trim())
            .bind(&input.slug)
            .bind(input.description.as_deref())
            .bind(input.price)
            .bind(input.stock)
            .bind(input.category_id)
            .bind(input.image_ref.as_deref())
            .fetch_one(pool)
            .await
    }

    /// Find a product by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of products matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let (where_clause, bind_idx) = where_clause(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM products {where_clause} {ORDER_BY} \
             LIMIT ${bind_idx} OFFSET ${next_idx}",
            next_idx = bind_idx + 1,
        );
        bind_filter(sqlx::query_as::<_, Product>(&query), filter)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await
    }

    /// Number of products matching `filter`, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &ProductFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM products {where_clause}");
        let row: (i64,) = bind_filter(sqlx::query_as::<_, (i64,)>(&query), filter)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// All products of one category, newest first.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<Product>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE category_id = $1 {ORDER_BY}");
        sqlx::query_as::<_, Product>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update and bump `updated_at`.
    ///
    /// The current row is locked (`FOR UPDATE`) before the write so the
    /// returned `previous_image_ref` is exactly the value this update
    /// replaced, even with concurrent writers. Returns `None` if no row
    /// with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ProductChanges,
    ) -> Result<Option<UpdatedProduct>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT image_ref FROM products WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous_image_ref,)) = previous else {
            return Ok(None);
        };

        let update_query = format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                slug = COALESCE($3, slug), \
                description = CASE WHEN $4 THEN $5 ELSE description END, \
                price = COALESCE($6, price), \
                stock = COALESCE($7, stock), \
                category_id = COALESCE($8, category_id), \
                image_ref = COALESCE($9, image_ref), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let product = sqlx::query_as::<_, Product>(&update_query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.slug.as_deref())
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.price)
            .bind(input.stock)
            .bind(input.category_id)
            .bind(input.image_ref.as_deref())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(UpdatedProduct {
            product,
            previous_image_ref,
        }))
    }

    /// Delete a product, returning the removed row (`None` if absent).
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Product>, sqlx::Error> {
        let query = format!("DELETE FROM products WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Dynamic filter helpers
// ---------------------------------------------------------------------------

/// Build the `WHERE` clause for `filter`.
///
/// Returns the clause and the next free bind index. Binds must be applied
/// in the same order by [`bind_filter`].
fn where_clause(filter: &ProductFilter) -> (String, u32) {
    let mut conditions = Vec::new();
    let mut bind_idx = 1u32;

    if filter.search.is_some() {
        conditions.push(format!(
            "(name ILIKE ${bind_idx} OR description ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
    }
    if filter.category_id.is_some() {
        conditions.push(format!("category_id = ${bind_idx}"));
        bind_idx += 1;
    }
    if filter.min_price.is_some() {
        conditions.push(format!("price >= ${bind_idx}"));
        bind_idx += 1;
    }
    if filter.max_price.is_some() {
        conditions.push(format!("price <= ${bind_idx}"));
        bind_idx += 1;
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, bind_idx)
}

fn bind_filter<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    filter: &ProductFilter,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    if let Some(ref search) = filter.search {
        q = q.bind(format!("%{}%", escape_like(search)));
    }
    if let Some(category_id) = filter.category_id {
        q = q.bind(category_id);
    }
    if let Some(min_price) = filter.min_price {
        q = q.bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        q = q.bind(max_price);
    }
    q
}

/// Escape `LIKE` metacharacters so user input matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
