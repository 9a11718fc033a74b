use std::sync::Arc;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;
use tessera::permissions::CapabilityRegistry;
use tessera::storage::SeaOrmCapabilityStore;

/// Migrated SQLite database in a temp directory, removed on drop.
pub struct TestDb {
    connection: DatabaseConnection,
    url: String,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("tessera.db").display());

        let connection = Database::connect(&url)
            .await
            .expect("Failed to connect to test database");
        migration::Migrator::up(&connection, None)
            .await
            .expect("Failed to run migrations");

        Self {
            connection,
            url,
            _dir: dir,
        }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Connection string, for code that opens its own connection.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn capability_store(&self) -> SeaOrmCapabilityStore {
        SeaOrmCapabilityStore::new(self.connection.clone())
    }

    /// A fresh registry over this database, as a process would build it at
    /// startup.
    pub async fn registry(&self) -> CapabilityRegistry {
        let registry = CapabilityRegistry::new();
        registry
            .initialize(Arc::new(self.capability_store()))
            .await
            .expect("Failed to load capabilities");
        registry
    }
}
