//! Projects collection metadata into TypeScript interface declarations for
//! client code generation.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::schema::naming::interface_name;
use crate::schema::types::{CollectionMetadata, FieldType};

pub const MODULE_BANNER: &str = "// Generated by tessera. Do not edit by hand.\n";

pub fn ts_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String | FieldType::Identifier => "string",
        FieldType::Integer | FieldType::Float => "number",
        FieldType::Boolean => "boolean",
        FieldType::Timestamp => "Date",
        FieldType::Composite => "any",
    }
}

pub fn render_interface(meta: &CollectionMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "export interface {} {{",
        interface_name(&meta.collection_name)
    );
    for field in &meta.fields {
        let optional = if field.required || field.is_primary_identifier {
            ""
        } else {
            "?"
        };
        let _ = writeln!(
            out,
            "  {}{}: {};",
            field.name,
            optional,
            ts_type(field.declared_type)
        );
    }
    out.push_str("}\n");
    out
}

/// Joins rendered interfaces (ordered by collection name) into one module.
pub fn render_module(interfaces: &BTreeMap<String, String>) -> String {
    let body: Vec<&str> = interfaces.values().map(String::as_str).collect();
    format!("{MODULE_BANNER}\n{}", body.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldDescriptor;

    fn field(name: &str, declared_type: FieldType, required: bool, pk: bool) -> FieldDescriptor {
        FieldDescriptor {
            name: name.into(),
            declared_type,
            required,
            is_primary_identifier: pk,
        }
    }

    #[test]
    fn test_render_interface() {
        let meta = CollectionMetadata {
            collection_name: "blog_posts".into(),
            restricted: false,
            fields: vec![
                field("id", FieldType::Identifier, false, true),
                field("title", FieldType::String, true, false),
                field("views", FieldType::Integer, false, false),
                field("rating", FieldType::Float, false, false),
                field("published", FieldType::Boolean, true, false),
                field("published_at", FieldType::Timestamp, false, false),
                field("extra", FieldType::Composite, false, false),
            ],
        };

        let expected = "export interface BlogPost {\n  \
                        id: string;\n  \
                        title: string;\n  \
                        views?: number;\n  \
                        rating?: number;\n  \
                        published: boolean;\n  \
                        published_at?: Date;\n  \
                        extra?: any;\n\
                        }\n";
        assert_eq!(render_interface(&meta), expected);
    }

    #[test]
    fn test_render_module_orders_by_collection() {
        let mut interfaces = BTreeMap::new();
        interfaces.insert("users".to_string(), "export interface User {\n}\n".to_string());
        interfaces.insert("posts".to_string(), "export interface Post {\n}\n".to_string());

        let module = render_module(&interfaces);
        assert!(module.starts_with(MODULE_BANNER));
        let post = module.find("interface Post").unwrap();
        let user = module.find("interface User").unwrap();
        assert!(post < user);
    }
}
