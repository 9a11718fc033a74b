use serde::{Deserialize, Serialize};

/// Semantic type tag carried by every exposed field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Identifier,
    Composite,
}

/// One exposed attribute of a registered record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// External (serialized) name
    pub name: String,
    pub declared_type: FieldType,
    /// Storage layer enforces non-null
    pub required: bool,
    pub is_primary_identifier: bool,
}

/// Metadata for one registered record type. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionMetadata {
    pub collection_name: String,
    pub restricted: bool,
    /// Declaration order, embedded members flattened in place
    pub fields: Vec<FieldDescriptor>,
}

impl CollectionMetadata {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Required fields the caller must supply. Primary identifiers are
    /// system-generated and never demanded from the caller.
    pub fn required_field_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| f.required && !f.is_primary_identifier)
            .map(|f| f.name.clone())
            .collect()
    }
}

/// Discovery snapshot entry returned by `SchemaRegistry::list_all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub restricted: bool,
}

/// Outcome of checking a submitted body against a collection.
///
/// `missing` follows field declaration order; `unknown` follows the
/// iteration order of the submitted map and should be treated as a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BodyValidation {
    pub missing: Vec<String>,
    pub unknown: Vec<String>,
}

impl BodyValidation {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.unknown.is_empty()
    }
}

/// Declarative description of an application record type.
///
/// Built once per type, either in code through [`RecordType`] or by
/// deserializing a JSON schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub type_name: String,
    /// Overrides the derived collection name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default)]
    pub concealed: bool,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Field(FieldMember),
    /// Anonymous composition: flattened into the enclosing type
    Embedded(EmbeddedMember),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMember {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Storage annotation, e.g. `type:varchar(100);not null`
    #[serde(default)]
    pub storage: String,
    /// Serialization rename annotation, e.g. `title,omitempty`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedMember {
    pub name: String,
    pub definition: TypeDefinition,
}

impl Member {
    pub fn field(name: &str, field_type: FieldType, storage: &str) -> Self {
        Member::Field(FieldMember {
            name: name.to_string(),
            field_type,
            storage: storage.to_string(),
            rename: None,
        })
    }

    pub fn renamed(name: &str, field_type: FieldType, storage: &str, rename: &str) -> Self {
        Member::Field(FieldMember {
            name: name.to_string(),
            field_type,
            storage: storage.to_string(),
            rename: Some(rename.to_string()),
        })
    }

    pub fn embedded(definition: TypeDefinition) -> Self {
        Member::Embedded(EmbeddedMember {
            name: definition.type_name.clone(),
            definition,
        })
    }

    pub fn name(&self) -> &str {
        match self {
            Member::Field(f) => &f.name,
            Member::Embedded(e) => &e.name,
        }
    }
}

impl TypeDefinition {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            table_name: None,
            restricted: false,
            concealed: false,
            members: Vec::new(),
        }
    }

    pub fn table_name(mut self, name: &str) -> Self {
        self.table_name = Some(name.to_string());
        self
    }

    pub fn restricted(mut self) -> Self {
        self.restricted = true;
        self
    }

    pub fn concealed(mut self) -> Self {
        self.concealed = true;
        self
    }

    pub fn member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    pub fn field(self, name: &str, field_type: FieldType, storage: &str) -> Self {
        self.member(Member::field(name, field_type, storage))
    }

    pub fn renamed_field(
        self,
        name: &str,
        field_type: FieldType,
        storage: &str,
        rename: &str,
    ) -> Self {
        self.member(Member::renamed(name, field_type, storage, rename))
    }

    pub fn embed(self, definition: TypeDefinition) -> Self {
        self.member(Member::embedded(definition))
    }
}

/// Implemented by record types that describe themselves to the registry.
pub trait RecordType {
    fn definition() -> TypeDefinition;
}
