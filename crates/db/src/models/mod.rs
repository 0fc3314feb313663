//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A create DTO for inserts
//! - A change DTO (all `Option` fields) for partial updates

pub mod category;
pub mod product;
