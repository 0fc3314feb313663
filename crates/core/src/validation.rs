//! Field-level parsing and validation for catalog writes.
//!
//! Request decoding hands raw strings (multipart text fields, query
//! parameters) to these helpers so every malformed value surfaces as
//! [`CoreError::Validation`] with a message naming the offending field.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::error::CoreError;
use crate::types::{DbId, Price};

/// Maximum length for names and slugs (matches the `VARCHAR(255)` columns).
pub const MAX_TEXT_LEN: usize = 255;

/// Largest price representable by the `NUMERIC(12, 2)` column.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

/// Lowercase alphanumeric words separated by single hyphens.
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

/// Validate a display name: non-blank and at most [`MAX_TEXT_LEN`] characters.
pub fn validate_name(field: &str, value: &str) -> Result<(), CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a URL-safe slug such as `macbook-pro-16`.
pub fn validate_slug(value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation("slug must not be empty".into()));
    }
    if value.len() > MAX_TEXT_LEN {
        return Err(CoreError::Validation(format!(
            "slug must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    if !SLUG_RE.is_match(value) {
        return Err(CoreError::Validation(format!(
            "slug '{value}' must contain only lowercase letters, digits and single hyphens"
        )));
    }
    Ok(())
}

/// Parse a price such as `"999.99"`.
///
/// Rejects non-numeric input, negative values, more than two fractional
/// digits, and values beyond [`MAX_PRICE`]. The result always carries two
/// fractional digits, as the `NUMERIC(12, 2)` column returns it.
pub fn parse_price(raw: &str) -> Result<Price, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::Validation("price is required".into()));
    }
    let mut price = Decimal::from_str(raw)
        .map_err(|_| CoreError::Validation(format!("price must be a number, got '{raw}'")))?;
    validate_price(price)?;
    price.rescale(2);
    Ok(price)
}

/// Range and precision checks shared by every price entry point.
pub fn validate_price(price: Price) -> Result<(), CoreError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(CoreError::Validation("price must not be negative".into()));
    }
    if price.normalize().scale() > 2 {
        return Err(CoreError::Validation(
            "price must have at most two decimal places".into(),
        ));
    }
    if price > MAX_PRICE {
        return Err(CoreError::Validation(format!(
            "price must not exceed {MAX_PRICE}"
        )));
    }
    Ok(())
}

/// Parse a price bound used for filtering (`minPrice` / `maxPrice`).
///
/// Bounds are not persisted, so any non-negative decimal is accepted.
pub fn parse_price_bound(field: &str, raw: &str) -> Result<Price, CoreError> {
    let raw = raw.trim();
    let bound = Decimal::from_str(raw)
        .map_err(|_| CoreError::Validation(format!("{field} must be a number, got '{raw}'")))?;
    if bound.is_sign_negative() && !bound.is_zero() {
        return Err(CoreError::Validation(format!("{field} must not be negative")));
    }
    Ok(bound)
}

/// Parse a stock count. Must be a non-negative integer.
pub fn parse_stock(raw: &str) -> Result<i32, CoreError> {
    let raw = raw.trim();
    let stock: i32 = raw
        .parse()
        .map_err(|_| CoreError::Validation(format!("stock must be an integer, got '{raw}'")))?;
    validate_stock(stock)?;
    Ok(stock)
}

pub fn validate_stock(stock: i32) -> Result<(), CoreError> {
    if stock < 0 {
        return Err(CoreError::Validation("stock must not be negative".into()));
    }
    Ok(())
}

/// Parse a positive entity id supplied as text (e.g. the `categoryId` form field).
pub fn parse_id(field: &str, raw: &str) -> Result<DbId, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    match raw.parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(CoreError::Validation(format!(
            "{field} must be a positive integer, got '{raw}'"
        ))),
    }
}
