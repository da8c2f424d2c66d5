use sea_orm_migration::prelude::*;

mod m20250101_000001_create_reporting_users_table;
mod m20250101_000002_create_officers_table;
mod m20250101_000003_create_missing_reports_table;
mod m20250101_000004_create_report_photos_table;
mod m20250101_000005_create_report_status_events_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_reporting_users_table::Migration),
            Box::new(m20250101_000002_create_officers_table::Migration),
            Box::new(m20250101_000003_create_missing_reports_table::Migration),
            Box::new(m20250101_000004_create_report_photos_table::Migration),
            Box::new(m20250101_000005_create_report_status_events_table::Migration),
        ]
    }
}
