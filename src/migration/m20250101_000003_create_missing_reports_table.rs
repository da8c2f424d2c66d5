use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum MissingReports {
    Table,
    Id,
    UserId,
    ReporterName,
    ReporterPhone,
    ReporterRelation,
    SubjectKind,
    SubjectName,
    Subject,
    LastSeenLocation,
    LastSeenAt,
    Description,
    Status,
    FoundAt,
    StatusUpdatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ReportingUsers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Officers {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MissingReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MissingReports::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MissingReports::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(MissingReports::ReporterName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissingReports::ReporterPhone)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissingReports::ReporterRelation)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MissingReports::SubjectKind)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissingReports::SubjectName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MissingReports::Subject).json_binary().not_null())
                    .col(
                        ColumnDef::new(MissingReports::LastSeenLocation)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MissingReports::LastSeenAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MissingReports::Description).text().null())
                    .col(
                        ColumnDef::new(MissingReports::Status)
                            .string_len(20)
                            .not_null()
                            .default("active"),
                    )
                    .col(ColumnDef::new(MissingReports::FoundAt).timestamp().null())
                    .col(
                        ColumnDef::new(MissingReports::StatusUpdatedBy)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MissingReports::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(MissingReports::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_missing_reports_user_id")
                            .from(MissingReports::Table, MissingReports::UserId)
                            .to(ReportingUsers::Table, ReportingUsers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_missing_reports_status_updated_by")
                            .from(MissingReports::Table, MissingReports::StatusUpdatedBy)
                            .to(Officers::Table, Officers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_missing_reports_status")
                    .table(MissingReports::Table)
                    .col(MissingReports::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_missing_reports_user_id")
                    .table(MissingReports::Table)
                    .col(MissingReports::UserId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MissingReports::Table).to_owned())
            .await
    }
}
