//! Turns a [`TypeDefinition`] into the flat, ordered field list the registry
//! stores, and picks up the restricted/concealed classification markers.
//!
//! Introspection never fails: unrecognised annotation text simply carries no
//! special meaning.

use crate::schema::types::{FieldDescriptor, FieldMember, Member, TypeDefinition};

/// Member name (lowercased) that marks the enclosing type as restricted.
pub const RESTRICTED_MARKER: &str = "adminonly";
/// Member name (lowercased) that hides the enclosing type from the registry.
pub const CONCEALED_MARKER: &str = "hidden";

const NOT_NULL: &str = "not null";
const PRIMARY_KEY: &str = "primarykey";

/// Everything the registry needs to know about one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Introspection {
    pub fields: Vec<FieldDescriptor>,
    pub restricted: bool,
    pub concealed: bool,
}

pub fn introspect(def: &TypeDefinition) -> Introspection {
    let mut out = Introspection {
        fields: Vec::new(),
        restricted: def.restricted,
        concealed: def.concealed,
    };
    flatten(&def.members, true, &mut out);
    out
}

pub fn extract_fields(def: &TypeDefinition) -> Vec<FieldDescriptor> {
    introspect(def).fields
}

/// Markers only classify the type when declared among its own members;
/// inside an embedded structure they are dropped like any other marker.
fn flatten(members: &[Member], top_level: bool, out: &mut Introspection) {
    for member in members {
        match member.name().to_lowercase().as_str() {
            RESTRICTED_MARKER => {
                out.restricted |= top_level;
                continue;
            }
            CONCEALED_MARKER => {
                out.concealed |= top_level;
                continue;
            }
            _ => {}
        }

        match member {
            Member::Embedded(embedded) => {
                flatten(&embedded.definition.members, false, out);
            }
            Member::Field(field) => {
                if is_excluded(&field.storage) {
                    continue;
                }
                out.fields.push(describe(field));
            }
        }
    }
}

fn describe(field: &FieldMember) -> FieldDescriptor {
    FieldDescriptor {
        name: external_name(field),
        declared_type: field.field_type,
        required: field.storage.contains(NOT_NULL),
        is_primary_identifier: field.storage.to_lowercase().contains(PRIMARY_KEY),
    }
}

/// The storage annotation `-` (or `-:all`) drops the member entirely.
fn is_excluded(storage: &str) -> bool {
    matches!(storage.trim(), "-" | "-:all")
}

fn external_name(field: &FieldMember) -> String {
    match field.rename.as_deref().map(str::trim) {
        Some(rename) if !rename.is_empty() && rename != "-" => {
            let target = rename.split(',').next().unwrap_or_default();
            if target.is_empty() {
                field.name.clone()
            } else {
                target.to_string()
            }
        }
        _ => field.name.clone(),
    }
}
