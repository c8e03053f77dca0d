use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Task::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Task::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Task::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Task::Text).text().null())
                    .col(
                        ColumnDef::new(Task::Status)
                            .string_len(16)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(
                        ColumnDef::new(Task::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Task::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // List reads in creation order
        manager
            .create_index(
                Index::create()
                    .name("idx_task_created_at")
                    .table(Task::Table)
                    .col(Task::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_task_created_at")
                    .table(Task::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Task::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Task {
    Table,
    Id,
    Name,
    Text,
    Status,
    CreatedAt,
    UpdatedAt,
}
