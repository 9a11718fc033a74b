use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomCapabilities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomCapabilities::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(string_uniq(CustomCapabilities::Name))
                    .col(integer_uniq(CustomCapabilities::BitPosition))
                    .col(string(CustomCapabilities::Description).default(""))
                    .col(big_integer(CustomCapabilities::CreatedAt))
                    .col(big_integer(CustomCapabilities::UpdatedAt))
                    .col(big_integer_null(CustomCapabilities::DeletedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_custom_capabilities_deleted_at")
                    .table(CustomCapabilities::Table)
                    .col(CustomCapabilities::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomCapabilities::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CustomCapabilities {
    Table,
    Id,
    Name,
    BitPosition,
    Description,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
