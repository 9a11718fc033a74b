use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("Unknown collection `{0}`")]
    #[diagnostic(
        code(tessera::schema::unknown_collection),
        help("Collections can be addressed by their canonical, singular or type name")
    )]
    UnknownCollection(String),

    #[error("Failed to read schema definitions `{path}`")]
    #[diagnostic(
        code(tessera::schema::definition_load),
        help("Check that the file exists and is readable")
    )]
    DefinitionLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid schema definitions: {0}")]
    #[diagnostic(
        code(tessera::schema::invalid_definition),
        help("The file must hold a JSON array of type definitions with `type_name` and `members`")
    )]
    InvalidDefinition(String),
}

impl IntoResponse for SchemaError {
    fn into_response(self) -> Response {
        let status = match &self {
            SchemaError::UnknownCollection(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
