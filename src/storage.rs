use async_trait::async_trait;
use chrono::Utc;
use migration::MigratorTrait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, Database, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities;
use crate::errors::TesseraError;
use crate::permissions::{CapabilityStore, StoredCapability};
use crate::settings::Database as DbCfg;

/// Connect and bring the schema up to date.
pub async fn init(cfg: &DbCfg) -> Result<DatabaseConnection, TesseraError> {
    let db = Database::connect(&cfg.url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!(url = %cfg.url, "Database ready");
    Ok(db)
}

/// `custom_capabilities` table behind the capability engine.
#[derive(Debug, Clone)]
pub struct SeaOrmCapabilityStore {
    db: DatabaseConnection,
}

impl SeaOrmCapabilityStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CapabilityStore for SeaOrmCapabilityStore {
    async fn load_all(&self) -> Result<Vec<StoredCapability>, DbErr> {
        use entities::custom_capability::{Column, Entity};

        let models = Entity::find()
            .filter(Column::DeletedAt.is_null())
            .order_by_asc(Column::BitPosition)
            .all(&self.db)
            .await?;

        models
            .into_iter()
            .map(|m| {
                let bit_position = u8::try_from(m.bit_position).map_err(|_| {
                    DbErr::Custom(format!(
                        "capability `{}` has out-of-range bit position {}",
                        m.name, m.bit_position
                    ))
                })?;
                Ok(StoredCapability {
                    name: m.name,
                    bit_position,
                    description: m.description,
                })
            })
            .collect()
    }

    async fn insert(&self, name: &str, bit_position: u8, description: &str) -> Result<(), DbErr> {
        use entities::custom_capability::{ActiveModel, Column, Entity};

        let bit = i32::from(bit_position);
        let txn = self.db.begin().await?;

        // Soft-deleted rows still occupy the unique name and bit indexes
        Entity::delete_many()
            .filter(Column::DeletedAt.is_not_null())
            .filter(
                Condition::any()
                    .add(Column::Name.eq(name))
                    .add(Column::BitPosition.eq(bit)),
            )
            .exec(&txn)
            .await?;

        let now = Utc::now().timestamp();
        let row = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_string()),
            bit_position: Set(bit),
            description: Set(description.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };
        row.insert(&txn).await?;

        txn.commit().await
    }

    async fn delete(&self, name: &str) -> Result<(), DbErr> {
        use entities::custom_capability::{Column, Entity};

        let now = Utc::now().timestamp();
        Entity::update_many()
            .col_expr(Column::DeletedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Name.eq(name))
            .filter(Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
