use std::collections::{BTreeMap, HashMap, HashSet};

use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::schema::interface::render_interface;
use crate::schema::introspect::introspect;
use crate::schema::naming::{canonical_name, pluralize, singularize, snake_name};
use crate::schema::types::{
    BodyValidation, CollectionMetadata, CollectionSummary, FieldDescriptor, RecordType,
    TypeDefinition,
};

/// Metadata for every registered record type, keyed by canonical collection
/// name, plus the singular alias index.
///
/// Populated during startup, then shared read-mostly across request handlers.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    inner: RwLock<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    collections: HashMap<String, CollectionMetadata>,
    /// singular alias -> canonical name
    aliases: HashMap<String, String>,
}

impl RegistryState {
    fn resolve(&self, name: &str) -> Option<String> {
        if self.collections.contains_key(name) {
            return Some(name.to_string());
        }
        if let Some(actual) = self.aliases.get(name) {
            return Some(actual.clone());
        }

        // Type-style names: `Posts` as given, then `Post` pluralized
        let snake = snake_name(name);
        let derived = pluralize(&snake);
        [snake, derived].into_iter().find_map(|candidate| {
            if self.collections.contains_key(&candidate) {
                Some(candidate)
            } else {
                self.aliases.get(&candidate).cloned()
            }
        })
    }
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one record type. Concealed types are skipped and `None` is
    /// returned; otherwise the canonical collection name is returned.
    /// Re-registering a name overwrites the earlier entry.
    pub fn register(&self, def: &TypeDefinition) -> Option<String> {
        let name = canonical_name(def);
        let result = introspect(def);
        if result.concealed {
            return None;
        }

        let mut state = self.inner.write();
        state.collections.insert(
            name.clone(),
            CollectionMetadata {
                collection_name: name.clone(),
                restricted: result.restricted,
                fields: result.fields,
            },
        );

        let singular = singularize(&name);
        if singular != name {
            state.aliases.insert(singular, name.clone());
        }

        Some(name)
    }

    pub fn register_type<T: RecordType>(&self) -> Option<String> {
        self.register(&T::definition())
    }

    /// Registers each definition in order and returns the collection names
    /// that were actually inserted. Not atomic across the batch.
    pub fn register_many<'a, I>(&self, defs: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a TypeDefinition>,
    {
        defs.into_iter().filter_map(|def| self.register(def)).collect()
    }

    /// Resolve a singular, plural or canonical name to the canonical
    /// collection name.
    pub fn resolve(&self, name: &str) -> Option<String> {
        self.inner.read().resolve(name)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn get_metadata(&self, collection: &str) -> Option<CollectionMetadata> {
        self.inner.read().collections.get(collection).cloned()
    }

    pub fn get_fields(&self, collection: &str) -> Option<Vec<FieldDescriptor>> {
        self.inner
            .read()
            .collections
            .get(collection)
            .map(|meta| meta.fields.clone())
    }

    pub fn get_field_names(&self, collection: &str) -> Vec<String> {
        self.inner
            .read()
            .collections
            .get(collection)
            .map(|meta| meta.fields.iter().map(|f| f.name.clone()).collect())
            .unwrap_or_default()
    }

    pub fn get_required_field_names(&self, collection: &str) -> Vec<String> {
        self.inner
            .read()
            .collections
            .get(collection)
            .map(CollectionMetadata::required_field_names)
            .unwrap_or_default()
    }

    /// Unknown collections are not implicitly restricted; existence is the
    /// caller's check.
    pub fn is_restricted(&self, collection: &str) -> bool {
        self.inner
            .read()
            .collections
            .get(collection)
            .is_some_and(|meta| meta.restricted)
    }

    /// Check a create body. An unregistered collection passes vacuously with
    /// two empty lists.
    pub fn validate_body(&self, collection: &str, submitted: &Map<String, Value>) -> BodyValidation {
        let state = self.inner.read();
        let Some(meta) = state.collections.get(collection) else {
            return BodyValidation::default();
        };

        let missing = meta
            .fields
            .iter()
            .filter(|f| f.required && !f.is_primary_identifier)
            .filter(|f| !submitted.contains_key(&f.name))
            .map(|f| f.name.clone())
            .collect();

        BodyValidation {
            missing,
            unknown: unknown_names(meta, submitted),
        }
    }

    /// Check an update body: only unknown names are reported.
    pub fn validate_partial_body(
        &self,
        collection: &str,
        submitted: &Map<String, Value>,
    ) -> BodyValidation {
        let state = self.inner.read();
        match state.collections.get(collection) {
            Some(meta) => BodyValidation {
                missing: Vec::new(),
                unknown: unknown_names(meta, submitted),
            },
            None => BodyValidation::default(),
        }
    }

    pub fn list_all(&self) -> BTreeMap<String, CollectionSummary> {
        self.inner
            .read()
            .collections
            .iter()
            .map(|(name, meta)| {
                (
                    name.clone(),
                    CollectionSummary {
                        restricted: meta.restricted,
                    },
                )
            })
            .collect()
    }

    pub fn describe_as_interface(&self, collection: &str) -> Option<String> {
        self.inner
            .read()
            .collections
            .get(collection)
            .map(render_interface)
    }

    pub fn describe_all_as_interfaces(&self) -> BTreeMap<String, String> {
        self.inner
            .read()
            .collections
            .iter()
            .map(|(name, meta)| (name.clone(), render_interface(meta)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn unknown_names(meta: &CollectionMetadata, submitted: &Map<String, Value>) -> Vec<String> {
    let known: HashSet<&str> = meta.fields.iter().map(|f| f.name.as_str()).collect();
    submitted
        .keys()
        .filter(|key| !known.contains(key.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldType;
    use serde_json::json;

    fn article() -> TypeDefinition {
        TypeDefinition::new("Article")
            .renamed_field("ID", FieldType::Identifier, "type:char(36);primaryKey;not null", "id")
            .renamed_field("A", FieldType::String, "not null", "A")
            .renamed_field("B", FieldType::Integer, "not null", "B")
            .renamed_field("C", FieldType::String, "", "C")
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn as_set(names: &[String]) -> HashSet<&str> {
        names.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = SchemaRegistry::new();
        let name = registry.register(&TypeDefinition::new("Category"));
        assert_eq!(name.as_deref(), Some("categories"));

        assert_eq!(registry.resolve("categories").as_deref(), Some("categories"));
        assert_eq!(registry.resolve("category").as_deref(), Some("categories"));
        assert_eq!(registry.resolve("Category").as_deref(), Some("categories"));
        assert!(registry.resolve("tags").is_none());
        assert!(registry.is_registered("category"));
    }

    #[test]
    fn test_resolve_through_alias_of_derived_name() {
        let registry = SchemaRegistry::new();
        registry.register(&TypeDefinition::new("Entry").table_name("journal_entries"));

        // "JournalEntry" -> "journal_entries" directly via derived form
        assert_eq!(registry.resolve("JournalEntry").as_deref(), Some("journal_entries"));
        assert_eq!(registry.resolve("journal_entry").as_deref(), Some("journal_entries"));
    }

    #[test]
    fn test_resolve_derived_form_hits_alias() {
        let registry = SchemaRegistry::new();
        registry.register(&TypeDefinition::new("Parcel").table_name("boxeses"));

        // "Box" derives "boxes", which only exists as the alias of "boxeses"
        assert_eq!(registry.resolve("boxes").as_deref(), Some("boxeses"));
        assert_eq!(registry.resolve("Box").as_deref(), Some("boxeses"));
        assert!(registry.resolve("Parcel").is_none());
    }

    #[test]
    fn test_resolve_plural_type_style_names() {
        let registry = SchemaRegistry::new();
        registry.register_many(&[
            TypeDefinition::new("Post"),
            TypeDefinition::new("Category"),
            TypeDefinition::new("UserToken"),
        ]);

        assert_eq!(registry.resolve("Posts").as_deref(), Some("posts"));
        assert_eq!(registry.resolve("Categories").as_deref(), Some("categories"));
        assert_eq!(registry.resolve("UserTokens").as_deref(), Some("user_tokens"));
        assert_eq!(registry.resolve("UserToken").as_deref(), Some("user_tokens"));
        assert!(registry.resolve("Postses").is_none());
    }

    #[test]
    fn test_alias_not_recorded_when_singular_equals_canonical() {
        let registry = SchemaRegistry::new();
        registry.register(&TypeDefinition::new("Press").table_name("press"));
        assert_eq!(registry.resolve("press").as_deref(), Some("press"));
        assert!(registry.inner.read().aliases.is_empty());
    }

    #[test]
    fn test_concealed_types_are_invisible() {
        let registry = SchemaRegistry::new();
        let hidden = TypeDefinition::new("UserToken")
            .field("Hidden", FieldType::String, "-:all")
            .field("Token", FieldType::String, "not null");

        assert!(registry.register(&hidden).is_none());
        assert!(registry.register(&TypeDefinition::new("Session").concealed()).is_none());

        assert!(registry.is_empty());
        assert!(registry.list_all().is_empty());
        for name in ["user_tokens", "user_token", "UserToken", "sessions", "session"] {
            assert!(registry.resolve(name).is_none(), "{name} should not resolve");
        }
    }

    #[test]
    fn test_restricted_classification() {
        let registry = SchemaRegistry::new();
        registry.register(&TypeDefinition::new("User").restricted());
        registry.register(
            &TypeDefinition::new("Invoice").field("AdminOnly", FieldType::String, "-:all"),
        );
        registry.register(&TypeDefinition::new("Post"));

        assert!(registry.is_restricted("users"));
        assert!(registry.is_restricted("invoices"));
        assert!(!registry.is_restricted("posts"));
        assert!(!registry.is_restricted("unknown"));

        let all = registry.list_all();
        assert_eq!(all.len(), 3);
        assert!(all["users"].restricted);
        assert!(!all["posts"].restricted);
    }

    #[test]
    fn test_validate_body() {
        let registry = SchemaRegistry::new();
        registry.register(&article());

        let ok = registry.validate_body("articles", &body(json!({ "A": 1, "B": 2 })));
        assert!(ok.missing.is_empty());
        assert!(ok.unknown.is_empty());
        assert!(ok.is_valid());

        let missing = registry.validate_body("articles", &body(json!({ "A": 1 })));
        assert_eq!(missing.missing, vec!["B".to_string()]);
        assert!(missing.unknown.is_empty());

        let unknown = registry.validate_body("articles", &body(json!({ "A": 1, "B": 2, "Z": 9 })));
        assert!(unknown.missing.is_empty());
        assert_eq!(as_set(&unknown.unknown), HashSet::from(["Z"]));
    }

    #[test]
    fn test_validate_body_reports_both_lists() {
        let registry = SchemaRegistry::new();
        registry.register(&article());

        let result = registry.validate_body("articles", &body(json!({ "X": 1, "Y": 2 })));
        assert_eq!(result.missing, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(as_set(&result.unknown), HashSet::from(["X", "Y"]));
    }

    #[test]
    fn test_validate_unknown_collection_passes_vacuously() {
        let registry = SchemaRegistry::new();
        let result = registry.validate_body("ghosts", &body(json!({ "anything": true })));
        assert_eq!(result, BodyValidation::default());

        let partial = registry.validate_partial_body("ghosts", &body(json!({ "x": 1 })));
        assert_eq!(partial, BodyValidation::default());
    }

    #[test]
    fn test_validate_partial_body() {
        let registry = SchemaRegistry::new();
        registry.register(&article());

        let result = registry.validate_partial_body("articles", &body(json!({ "C": "x", "Q": 1 })));
        assert!(result.missing.is_empty());
        assert_eq!(result.unknown, vec!["Q".to_string()]);
    }

    #[test]
    fn test_field_lookups() {
        let registry = SchemaRegistry::new();
        registry.register(&article());

        assert_eq!(registry.get_field_names("articles"), vec!["id", "A", "B", "C"]);
        assert_eq!(registry.get_required_field_names("articles"), vec!["A", "B"]);
        assert_eq!(registry.get_fields("articles").map(|f| f.len()), Some(4));
        assert!(registry.get_fields("nope").is_none());
        assert!(registry.get_field_names("nope").is_empty());
        assert!(registry.get_required_field_names("nope").is_empty());

        let meta = registry.get_metadata("articles").unwrap();
        assert_eq!(meta.collection_name, "articles");
        assert!(!meta.restricted);
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = SchemaRegistry::new();
        registry.register(&TypeDefinition::new("Post").field("Title", FieldType::String, ""));
        registry.register(
            &TypeDefinition::new("Post")
                .restricted()
                .field("Headline", FieldType::String, ""),
        );

        assert_eq!(registry.len(), 1);
        assert!(registry.is_restricted("posts"));
        assert_eq!(registry.get_field_names("posts"), vec!["Headline"]);
    }

    #[test]
    fn test_register_many_skips_concealed() {
        let registry = SchemaRegistry::new();
        let defs = vec![
            TypeDefinition::new("Post"),
            TypeDefinition::new("Token").concealed(),
            TypeDefinition::new("Comment"),
        ];
        let names = registry.register_many(&defs);
        assert_eq!(names, vec!["posts", "comments"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_describe_as_interfaces() {
        let registry = SchemaRegistry::new();
        registry.register(&article());
        registry.register(&TypeDefinition::new("Tag"));

        let text = registry.describe_as_interface("articles").unwrap();
        assert!(text.starts_with("export interface Article {"));
        assert!(text.contains("  id: string;"));
        assert!(text.contains("  A: string;"));
        assert!(text.contains("  B: number;"));
        assert!(text.contains("  C?: string;"));
        assert!(registry.describe_as_interface("ghosts").is_none());

        let all = registry.describe_all_as_interfaces();
        assert_eq!(all.keys().collect::<Vec<_>>(), vec!["articles", "tags"]);
        assert_eq!(all["tags"], "export interface Tag {\n}\n");
    }

    #[test]
    fn test_concurrent_readers() {
        use std::sync::Arc;

        let registry = Arc::new(SchemaRegistry::new());
        registry.register(&article());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        assert_eq!(registry.resolve("article").as_deref(), Some("articles"));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
