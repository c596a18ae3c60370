use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Additive: attachment locator and chart configuration on `articles`.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        if !manager.has_column("articles", "attachment").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Articles::Table)
                        .add_column(ColumnDef::new(Articles::Attachment).text().null())
                        .to_owned(),
                )
                .await?;
        }

        if !manager.has_column("articles", "chart_config").await? {
            manager
                .alter_table(
                    Table::alter()
                        .table(Articles::Table)
                        .add_column(ColumnDef::new(Articles::ChartConfig).text().null())
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Articles::Table)
                    .drop_column(Articles::Attachment)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Articles::Table)
                    .drop_column(Articles::ChartConfig)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Articles {
    Table,
    Attachment,
    ChartConfig,
}
