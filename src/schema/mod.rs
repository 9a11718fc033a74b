//! Schema metadata registry: record-type introspection, collection naming
//! and interface generation.

pub mod builtin;
pub mod errors;
pub mod interface;
pub mod introspect;
pub mod loader;
pub mod naming;
pub mod registry;
pub mod types;

pub use errors::SchemaError;
pub use registry::SchemaRegistry;
pub use types::{
    BodyValidation, CollectionMetadata, CollectionSummary, FieldDescriptor, FieldType, Member,
    RecordType, TypeDefinition,
};
