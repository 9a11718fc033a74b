use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum CapabilityError {
    #[error("Capability `{0}` not found")]
    #[diagnostic(code(tessera::capability::not_found))]
    NotFound(String),

    #[error("Maximum number of capabilities reached ({max})")]
    #[diagnostic(
        code(tessera::capability::capacity_exceeded),
        help("Unregister unused custom capabilities and restart to reclaim their bits")
    )]
    CapacityExceeded { max: u8 },

    #[error("Capability `{0}` is built in and cannot be unregistered")]
    #[diagnostic(code(tessera::capability::builtin_immutable))]
    BuiltinImmutable(String),

    #[error("Stored capability `{name}` at bit {bit_position} is invalid: {reason}")]
    #[diagnostic(
        code(tessera::capability::invalid_stored),
        help("Custom capabilities must use bits between the built-in count and 63 and must not reuse built-in names")
    )]
    InvalidStoredCapability {
        name: String,
        bit_position: u8,
        reason: String,
    },

    #[error("Capability persistence failed: {0}")]
    #[diagnostic(code(tessera::capability::persistence))]
    Persistence(#[from] sea_orm::DbErr),
}

impl IntoResponse for CapabilityError {
    fn into_response(self) -> Response {
        let status = match &self {
            CapabilityError::NotFound(_) => StatusCode::NOT_FOUND,
            CapabilityError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            CapabilityError::BuiltinImmutable(_) => StatusCode::FORBIDDEN,
            CapabilityError::InvalidStoredCapability { .. } | CapabilityError::Persistence(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
