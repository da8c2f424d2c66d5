use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Officers {
    Table,
    Id,
    BadgeNumber,
    Station,
    PasswordHash,
    Approved,
    ApprovedBy,
    ApprovedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Officers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Officers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Officers::BadgeNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Officers::Station).string_len(100).not_null())
                    .col(ColumnDef::new(Officers::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Officers::Approved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Officers::ApprovedBy).integer().null())
                    .col(ColumnDef::new(Officers::ApprovedAt).timestamp().null())
                    .col(
                        ColumnDef::new(Officers::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_officers_approved_by")
                            .from(Officers::Table, Officers::ApprovedBy)
                            .to(Officers::Table, Officers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Login looks officers up by (badge, station).
        manager
            .create_index(
                Index::create()
                    .name("idx_officers_badge_station")
                    .table(Officers::Table)
                    .col(Officers::BadgeNumber)
                    .col(Officers::Station)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Officers::Table).to_owned())
            .await
    }
}
