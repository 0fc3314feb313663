//! Page/limit pagination for product listings.

use serde::Serialize;

use crate::error::CoreError;

/// Page used when the client does not send `page`.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the client does not send `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest accepted page size; larger requests are clamped.
pub const MAX_LIMIT: i64 = 100;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build a page request, rejecting `page < 1` or `limit < 1`.
    ///
    /// `limit` above [`MAX_LIMIT`] is clamped rather than rejected.
    pub fn new(page: i64, limit: i64) -> Result<Self, CoreError> {
        if page < 1 {
            return Err(CoreError::Validation(format!(
                "page must be at least 1, got {page}"
            )));
        }
        if limit < 1 {
            return Err(CoreError::Validation(format!(
                "limit must be at least 1, got {limit}"
            )));
        }
        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    /// Parse raw `page` / `limit` query values, applying defaults for absent ones.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, CoreError> {
        let page = parse_positive("page", page, DEFAULT_PAGE)?;
        let limit = parse_positive("limit", limit, DEFAULT_LIMIT)?;
        Self::new(page, limit)
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(field: &str, raw: Option<&str>, default: i64) -> Result<i64, CoreError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            CoreError::Validation(format!("{field} must be an integer, got '{raw}'"))
        }),
    }
}

/// Pagination metadata returned next to a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl PageInfo {
    /// `total_pages` is `ceil(total / limit)`; zero when nothing matched.
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = if total <= 0 {
            0
        } else {
            (total + request.limit - 1) / request.limit
        };
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults_apply_to_missing_and_blank_values() {
        assert_eq!(PageRequest::parse(None, None).unwrap(), PageRequest::default());
        let req = PageRequest::parse(Some(""), Some(" ")).unwrap();
        assert_eq!((req.page(), req.limit()), (1, 10));
    }

    #[test]
    fn offset_is_zero_based() {
        let req = PageRequest::new(3, 20).unwrap();
        assert_eq!(req.offset(), 40);
        assert_eq!(PageRequest::default().offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let req = PageRequest::new(1, 10_000).unwrap();
        assert_eq!(req.limit(), MAX_LIMIT);
    }

    #[test]
    fn rejects_non_positive_and_non_numeric() {
        assert_matches!(PageRequest::new(0, 10), Err(CoreError::Validation(_)));
        assert_matches!(PageRequest::new(1, 0), Err(CoreError::Validation(_)));
        assert_matches!(
            PageRequest::parse(Some("two"), None),
            Err(CoreError::Validation(msg)) if msg.contains("page")
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(1, 10).unwrap();
        assert_eq!(PageInfo::new(req, 0).total_pages, 0);
        assert_eq!(PageInfo::new(req, 10).total_pages, 1);
        assert_eq!(PageInfo::new(req, 11).total_pages, 2);
    }
}
