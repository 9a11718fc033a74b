use std::path::Path;

use crate::schema::errors::SchemaError;
use crate::schema::types::TypeDefinition;

/// Load a JSON array of type definitions from disk.
pub fn load_definitions(path: &Path) -> Result<Vec<TypeDefinition>, SchemaError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SchemaError::DefinitionLoad {
        path: path.display().to_string(),
        source,
    })?;
    parse_definitions(&contents)
}

pub fn parse_definitions(contents: &str) -> Result<Vec<TypeDefinition>, SchemaError> {
    serde_json::from_str(contents).map_err(|e| SchemaError::InvalidDefinition(e.to_string()))
}
