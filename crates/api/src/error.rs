use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `catalog_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request that could not be decoded (malformed multipart body, etc.).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Status, machine-readable code and client-facing message for this error.
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::InvalidAsset(msg) => {
                    (StatusCode::BAD_REQUEST, "INVALID_ASSET", msg.clone())
                }
                CoreError::Constraint(violation) => {
                    (StatusCode::CONFLICT, "CONFLICT", violation.to_string())
                }
                CoreError::Unavailable(msg) => {
                    tracing::error!(error = %msg, "Backing store unavailable");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// A body cut off by the request size limit is reported as an oversized
/// image; any other decoding failure is a bad request.
impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::Core(CoreError::InvalidAsset(
                "Upload exceeds the maximum allowed size".into(),
            ));
        }
        AppError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(err: MultipartRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::Core(CoreError::Validation(err.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(err: PathRejection) -> Self {
        AppError::Core(CoreError::Validation(err.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(err: QueryRejection) -> Self {
        AppError::Core(CoreError::Validation(err.body_text()))
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::error::ConstraintViolation;

    use super::*;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        let cases = [
            (
                CoreError::Validation("price is required".into()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                CoreError::InvalidAsset("bad type".into()),
                StatusCode::BAD_REQUEST,
                "INVALID_ASSET",
            ),
            (
                CoreError::Constraint(ConstraintViolation::UnknownCategory),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                CoreError::NotFound {
                    entity: "Product",
                    id: 7,
                },
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                CoreError::Unavailable("disk full".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            let (got_status, got_code, _) = AppError::Core(err).parts();
            assert_eq!((got_status, got_code), (status, code));
        }
    }

    #[test]
    fn unavailable_message_is_sanitized() {
        let (_, _, message) =
            AppError::Core(CoreError::Unavailable("password=secret".into())).parts();
        assert_eq!(message, "An internal error occurred");
    }

    #[test]
    fn constraint_message_names_the_violation() {
        let (_, _, message) = AppError::Core(CoreError::Constraint(
            ConstraintViolation::DuplicateSlug { entity: "product" },
        ))
        .parts();
        assert_eq!(message, "A product with this slug already exists");
    }
}
