//! Storage seams. Services only ever see these traits, so the Postgres
//! implementations and the in-memory ones are interchangeable.

pub mod memory;
pub mod photos;
pub mod postgres;

use crate::domain::{
    MissingReport, NewOfficer, NewReport, NewReportingUser, Officer, ReportingUser,
    StatusChange, StatusEvent,
};
use crate::error::AppResult;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;

pub use memory::{MemoryAccountRepository, MemoryReportRepository};
pub use photos::{DiskPhotoStore, MemoryPhotoStore};
pub use postgres::{SeaOrmAccountRepository, SeaOrmReportRepository};

#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Commit a new report (status `active`) together with its photo
    /// references. Either everything is visible afterwards or nothing is.
    async fn insert(&self, report: NewReport) -> AppResult<MissingReport>;

    /// Every report in insertion order.
    async fn list(&self) -> AppResult<Vec<MissingReport>>;

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<MissingReport>>;

    async fn find(&self, id: i32) -> AppResult<Option<MissingReport>>;

    /// Atomically set `change.to` if the stored status still equals
    /// `change.from`, recording the audit event in the same unit.
    /// Returns `None` when the stored status did not match (or the report
    /// does not exist).
    async fn compare_and_set_status(&self, change: &StatusChange)
        -> AppResult<Option<MissingReport>>;

    async fn history(&self, report_id: i32) -> AppResult<Vec<StatusEvent>>;

    async fn ping(&self) -> bool;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already registered.
    async fn insert_user(&self, user: NewReportingUser) -> AppResult<ReportingUser>;

    async fn find_user(&self, id: i32) -> AppResult<Option<ReportingUser>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<ReportingUser>>;

    async fn find_users(&self, ids: &[i32]) -> AppResult<Vec<ReportingUser>>;

    /// Fails with `Conflict` when the badge number is already registered.
    async fn insert_officer(&self, officer: NewOfficer) -> AppResult<Officer>;

    async fn find_officer(&self, id: i32) -> AppResult<Option<Officer>>;

    async fn find_officer_by_badge(&self, badge_number: &str) -> AppResult<Option<Officer>>;

    async fn approve_officer(&self, id: i32, approved_by: Option<i32>) -> AppResult<Officer>;
}

/// Blob store for report photos, keyed by generated filename.
#[async_trait]
pub trait PhotoStore: Send + Sync {
    async fn put(&self, name: &str, data: &[u8]) -> AppResult<()>;

    async fn get(&self, name: &str) -> AppResult<Option<Vec<u8>>>;

    async fn delete(&self, name: &str) -> AppResult<()>;
}

/// Handle to every storage collaborator, passed to handlers as an extension.
#[derive(Clone)]
pub struct Storage {
    pub reports: Arc<dyn ReportRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub photos: Arc<dyn PhotoStore>,
}

impl Storage {
    pub fn postgres(db: DatabaseConnection, photo_root: impl Into<PathBuf>) -> Self {
        Self {
            reports: Arc::new(SeaOrmReportRepository::new(db.clone())),
            accounts: Arc::new(SeaOrmAccountRepository::new(db)),
            photos: Arc::new(DiskPhotoStore::new(photo_root)),
        }
    }

    /// Reports and accounts in memory, photos on disk.
    pub fn memory_with_disk_photos(photo_root: impl Into<PathBuf>) -> Self {
        Self {
            reports: Arc::new(MemoryReportRepository::new()),
            accounts: Arc::new(MemoryAccountRepository::new()),
            photos: Arc::new(DiskPhotoStore::new(photo_root)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            reports: Arc::new(MemoryReportRepository::new()),
            accounts: Arc::new(MemoryAccountRepository::new()),
            photos: Arc::new(MemoryPhotoStore::new()),
        }
    }
}
