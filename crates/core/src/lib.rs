//! Domain building blocks shared by the catalog crates: the error taxonomy,
//! id/timestamp types, field validation, pagination, and the asset store.

pub mod assets;
pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;
