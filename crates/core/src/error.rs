use crate::types::DbId;

/// Which uniqueness or referential invariant a rejected write would break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// Another row of the same entity already uses this slug.
    DuplicateSlug { entity: &'static str },
    /// Another category already uses this name.
    DuplicateName { entity: &'static str },
    /// The referenced category does not exist.
    UnknownCategory,
    /// The category is still referenced by at least one product.
    CategoryInUse,
}

impl std::fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSlug { entity } => write!(f, "A {entity} with this slug already exists"),
            Self::DuplicateName { entity } => write!(f, "A {entity} with this name already exists"),
            Self::UnknownCategory => f.write_str("Category does not exist"),
            Self::CategoryInUse => f.write_str("Category still has products assigned to it"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Constraint violation: {0}")]
    Constraint(ConstraintViolation),

    #[error("Invalid asset: {0}")]
    InvalidAsset(String),

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl CoreError {
    /// Wrap any I/O-ish failure of a backing store.
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<ConstraintViolation> for CoreError {
    fn from(violation: ConstraintViolation) -> Self {
        Self::Constraint(violation)
    }
}
