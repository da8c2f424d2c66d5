use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum ReportingUsers {
    Table,
    Id,
    FullName,
    Email,
    PasswordHash,
    Phone,
    Address,
    DateOfBirth,
    EmergencyContact,
    EmergencyPhone,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReportingUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReportingUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReportingUsers::FullName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReportingUsers::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(ReportingUsers::PasswordHash)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ReportingUsers::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(ReportingUsers::Address).text().null())
                    .col(ColumnDef::new(ReportingUsers::DateOfBirth).date().null())
                    .col(
                        ColumnDef::new(ReportingUsers::EmergencyContact)
                            .string_len(100)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReportingUsers::EmergencyPhone)
                            .string_len(20)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReportingUsers::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReportingUsers::Table).to_owned())
            .await
    }
}
