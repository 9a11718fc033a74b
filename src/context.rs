use std::sync::Arc;

use crate::errors::TesseraError;
use crate::permissions::CapabilityRegistry;
use crate::schema::builtin::default_schema;
use crate::schema::loader::load_definitions;
use crate::schema::{SchemaRegistry, TypeDefinition};
use crate::settings::Settings;
use crate::storage::{self, SeaOrmCapabilityStore};

/// Process-wide state built once at startup and handed to every consumer.
#[derive(Debug, Clone, Default)]
pub struct CmsContext {
    pub schema: Arc<SchemaRegistry>,
    pub capabilities: Arc<CapabilityRegistry>,
}

impl CmsContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh context with `defs` registered, in order.
    pub fn with_definitions<'a, I>(defs: I) -> Self
    where
        I: IntoIterator<Item = &'a TypeDefinition>,
    {
        let ctx = Self::new();
        ctx.schema.register_many(defs);
        ctx
    }

    /// Startup sweep: register the built-in and configured record types,
    /// then attach the database and load custom capabilities.
    pub async fn bootstrap(settings: &Settings) -> Result<Self, TesseraError> {
        let defs = schema_definitions(settings.schema.definitions.as_deref())?;
        let ctx = Self::with_definitions(&defs);
        tracing::info!(
            definitions = defs.len(),
            collections = ctx.schema.len(),
            "Registered record types"
        );

        let db = storage::init(&settings.database).await?;
        let loaded = ctx
            .capabilities
            .initialize(Arc::new(SeaOrmCapabilityStore::new(db)))
            .await?;
        tracing::info!(
            custom = loaded,
            next_bit = ctx.capabilities.next_bit(),
            "Loaded custom capabilities"
        );

        Ok(ctx)
    }
}

/// Built-in record types followed by those in the optional definitions file.
pub fn schema_definitions(
    extra: Option<&std::path::Path>,
) -> Result<Vec<TypeDefinition>, TesseraError> {
    let mut defs = default_schema();
    if let Some(path) = extra {
        defs.extend(load_definitions(path)?);
    }
    Ok(defs)
}
