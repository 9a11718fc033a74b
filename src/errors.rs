use miette::Diagnostic;
use thiserror::Error;

use crate::permissions::CapabilityError;
use crate::schema::SchemaError;

#[derive(Debug, Error, Diagnostic)]
pub enum TesseraError {
    #[error("Database error: {0}")]
    #[diagnostic(code(tessera::db))]
    Db(#[from] sea_orm::DbErr),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Capability(#[from] CapabilityError),
}
