use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "CREATE TABLE report_photos (
                id SERIAL PRIMARY KEY,
                report_id INTEGER NOT NULL REFERENCES missing_reports(id) ON DELETE CASCADE,
                position INTEGER NOT NULL CHECK (position >= 0 AND position < 5),
                filename VARCHAR(128) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (report_id, position)
            )",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS report_photos")
            .await?;
        Ok(())
    }
}
