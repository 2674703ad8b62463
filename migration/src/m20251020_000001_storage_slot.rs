use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StorageSlot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StorageSlot::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StorageSlot::Value).text().not_null())
                    .col(
                        ColumnDef::new(StorageSlot::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StorageSlot::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StorageSlot {
    Table,
    Key,
    Value,
    UpdatedAt,
}
