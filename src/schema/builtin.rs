//! Record types every deployment carries.

use crate::schema::types::{FieldType, RecordType, TypeDefinition};

/// Identity and audit columns embedded in every stored record.
pub struct BaseModel;

impl RecordType for BaseModel {
    fn definition() -> TypeDefinition {
        TypeDefinition::new("BaseModel")
            .renamed_field("ID", FieldType::Identifier, "type:char(36);primaryKey", "id")
            .renamed_field("CreatedAt", FieldType::Timestamp, "", "created_at")
            .renamed_field("UpdatedAt", FieldType::Timestamp, "", "updated_at")
            .renamed_field("DeletedAt", FieldType::Timestamp, "index", "deleted_at")
    }
}

pub struct User;

impl RecordType for User {
    fn definition() -> TypeDefinition {
        TypeDefinition::new("User")
            .restricted()
            .embed(BaseModel::definition())
            .renamed_field("Fullname", FieldType::String, "type:varchar(100);not null", "fullname")
            .renamed_field(
                "Email",
                FieldType::String,
                "type:varchar(100);uniqueIndex;not null",
                "email",
            )
            .renamed_field("Password", FieldType::String, "type:varchar(255);not null", "password")
            .renamed_field(
                "Permissions",
                FieldType::Integer,
                "not null;default:1",
                "permissions",
            )
    }
}

/// Session tokens: stored, never exposed through metadata.
pub struct UserToken;

impl RecordType for UserToken {
    fn definition() -> TypeDefinition {
        TypeDefinition::new("UserToken")
            .concealed()
            .embed(BaseModel::definition())
            .renamed_field("UserID", FieldType::Identifier, "type:char(36);not null;index", "user_id")
            .renamed_field("Token", FieldType::String, "type:char(64);not null;uniqueIndex", "token")
            .renamed_field("ExpiresAt", FieldType::Integer, "not null;index", "expires_at")
    }
}

pub fn default_schema() -> Vec<TypeDefinition> {
    vec![User::definition(), UserToken::definition()]
}
