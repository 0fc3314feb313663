//! Query parameter types for API handlers.

use serde::Deserialize;

use crate::service::ProductQuery;

/// Query parameters for `GET /products`.
///
/// Values are kept as text so malformed numbers surface as validation
/// errors naming the parameter rather than a generic extractor rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category_id: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl From<ProductListParams> for ProductQuery {
    fn from(params: ProductListParams) -> Self {
        ProductQuery {
            page: params.page,
            limit: params.limit,
            search: params.search,
            category_id: params.category_id,
            min_price: params.min_price,
            max_price: params.max_price,
        }
    }
}
