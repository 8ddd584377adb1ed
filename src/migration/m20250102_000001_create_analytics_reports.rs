//! Analytics reports prepared for a customer.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_tables::{owner_fk, timestamp};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AnalyticsReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnalyticsReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnalyticsReports::UserId).uuid().not_null())
                    .col(ColumnDef::new(AnalyticsReports::Title).string().not_null())
                    .col(
                        ColumnDef::new(AnalyticsReports::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(AnalyticsReports::ResultsUrl).string().null())
                    .col(timestamp(AnalyticsReports::CreatedAt))
                    .col(timestamp(AnalyticsReports::UpdatedAt))
                    .foreign_key(&mut owner_fk(
                        AnalyticsReports::Table,
                        AnalyticsReports::UserId,
                        ForeignKeyAction::Restrict,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_analytics_reports_user_id")
                    .table(AnalyticsReports::Table)
                    .col(AnalyticsReports::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(AnalyticsReports::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum AnalyticsReports {
    Table,
    Id,
    UserId,
    Title,
    Status,
    ResultsUrl,
    CreatedAt,
    UpdatedAt,
}
