use async_trait::async_trait;
use sea_orm::DbErr;
use serde::Serialize;

/// One live persisted custom capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredCapability {
    pub name: String,
    pub bit_position: u8,
    pub description: String,
}

/// Durable storage for runtime-registered capabilities.
#[async_trait]
pub trait CapabilityStore: Send + Sync {
    /// Live rows ordered by ascending bit position.
    async fn load_all(&self) -> Result<Vec<StoredCapability>, DbErr>;

    /// Persist `name` at `bit_position`. Either the row is stored or nothing
    /// changes.
    async fn insert(&self, name: &str, bit_position: u8, description: &str) -> Result<(), DbErr>;

    /// Remove the live row for `name`.
    async fn delete(&self, name: &str) -> Result<(), DbErr>;
}
