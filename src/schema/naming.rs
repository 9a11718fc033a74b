use convert_case::{Case, Casing};

use crate::schema::types::TypeDefinition;

/// Collection name for a type: the explicit table name if one is set,
/// otherwise the snake-cased, pluralized type name.
pub fn canonical_name(def: &TypeDefinition) -> String {
    match def.table_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => table_name_for(&def.type_name),
    }
}

/// `UserToken` -> `user_tokens`, `Category` -> `categories`.
pub fn table_name_for(name: &str) -> String {
    pluralize(&snake_name(name))
}

/// `UserTokens` -> `user_tokens`, without changing number.
pub fn snake_name(name: &str) -> String {
    name.to_case(Case::Snake)
}

pub fn singularize(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        return format!("{stem}y");
    }
    if ["ses", "xes", "zes", "ches", "shes"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        return name[..name.len() - 2].to_string();
    }
    if name.ends_with('s') && !name.ends_with("ss") {
        return name[..name.len() - 1].to_string();
    }
    name.to_string()
}

pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    if let Some(stem) = name.strip_suffix('y') {
        let after_vowel = stem.ends_with(['a', 'e', 'i', 'o', 'u']);
        if !stem.is_empty() && !after_vowel {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

/// Type name used when projecting a collection into an interface, e.g.
/// `user_tokens` -> `UserToken`.
pub fn interface_name(collection_name: &str) -> String {
    singularize(collection_name).to_case(Case::Pascal)
}
