//! HTTP decision surface over the schema registry and capability engine.
//! Authentication happens upstream; callers pass the capability mask they
//! want evaluated.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use miette::IntoDiagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::trace::TraceLayer;

use crate::context::CmsContext;
use crate::permissions::{has_capability, CapabilityError, CapabilitySet};
use crate::schema::interface::render_module;
use crate::schema::{BodyValidation, CollectionMetadata, CollectionSummary, SchemaError};
use crate::settings::Settings;

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub collection: String,
    pub valid: bool,
    #[serde(flatten)]
    pub validation: BodyValidation,
}

#[derive(Debug, Serialize)]
pub struct CapabilityView {
    pub name: String,
    pub bit: u8,
    pub mask: u64,
    pub builtin: bool,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    /// Capability mask held by the principal
    pub held: CapabilitySet,
    /// Capability names that must all be satisfied
    pub required: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub allowed: bool,
}

pub fn router(ctx: CmsContext) -> Router {
    Router::new()
        .route("/v1/collections", get(list_collections))
        .route("/v1/collections/{name}", get(collection_metadata))
        .route("/v1/collections/{name}/validate", post(validate_collection_body))
        .route("/v1/interfaces", get(interfaces))
        .route("/v1/capabilities", get(list_capabilities))
        .route("/v1/check", post(handle_check))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

pub async fn serve(settings: &Settings, ctx: CmsContext) -> miette::Result<()> {
    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .into_diagnostic()?;
    tracing::info!(%addr, "Listening");
    axum::serve(listener, router(ctx)).await.into_diagnostic()?;
    Ok(())
}

async fn list_collections(State(ctx): State<CmsContext>) -> Json<BTreeMap<String, CollectionSummary>> {
    Json(ctx.schema.list_all())
}

async fn collection_metadata(
    State(ctx): State<CmsContext>,
    Path(name): Path<String>,
) -> Result<Json<CollectionMetadata>, SchemaError> {
    ctx.schema
        .resolve(&name)
        .and_then(|collection| ctx.schema.get_metadata(&collection))
        .map(Json)
        .ok_or(SchemaError::UnknownCollection(name))
}

async fn validate_collection_body(
    State(ctx): State<CmsContext>,
    Path(name): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Json<ValidateResponse>, SchemaError> {
    let collection = ctx
        .schema
        .resolve(&name)
        .ok_or(SchemaError::UnknownCollection(name))?;
    let validation = ctx.schema.validate_body(&collection, &body);
    Ok(Json(ValidateResponse {
        collection,
        valid: validation.is_valid(),
        validation,
    }))
}

async fn interfaces(State(ctx): State<CmsContext>) -> String {
    render_module(&ctx.schema.describe_all_as_interfaces())
}

async fn list_capabilities(State(ctx): State<CmsContext>) -> Json<Vec<CapabilityView>> {
    let views = ctx
        .capabilities
        .capabilities()
        .into_iter()
        .map(|cap| CapabilityView {
            mask: cap.mask().bits(),
            builtin: cap.is_builtin(),
            bit: cap.bit,
            name: cap.name,
        })
        .collect();
    Json(views)
}

async fn handle_check(
    State(ctx): State<CmsContext>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, CapabilityError> {
    let mut required = CapabilitySet::EMPTY;
    for name in &req.required {
        let capability = ctx
            .capabilities
            .lookup(name)
            .ok_or_else(|| CapabilityError::NotFound(name.clone()))?;
        required |= capability.mask();
    }
    Ok(Json(CheckResponse {
        allowed: has_capability(req.held, required),
    }))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
