use super::{AccountRepository, ReportRepository};
use crate::domain::{
    MissingReport, NewOfficer, NewReport, NewReportingUser, Officer, ReportStatus,
    ReportingUser, StatusChange, StatusEvent,
};
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
struct ReportTable {
    next_id: i32,
    rows: Vec<MissingReport>,
    events: Vec<StatusEvent>,
}

/// Process-local report store. Rows keep insertion order and every status
/// write happens under the table's write lock.
#[derive(Default)]
pub struct MemoryReportRepository {
    table: RwLock<ReportTable>,
}

impl MemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for MemoryReportRepository {
    async fn insert(&self, report: NewReport) -> AppResult<MissingReport> {
        let mut table = self.table.write().await;
        table.next_id += 1;
        let now = chrono::Utc::now().naive_utc();

        let saved = MissingReport {
            id: table.next_id,
            user_id: report.user_id,
            reporter: report.reporter,
            subject: report.subject,
            last_seen_location: report.last_seen_location,
            last_seen_at: report.last_seen_at,
            description: report.description,
            photos: report.photos,
            status: ReportStatus::Active,
            found_at: None,
            created_at: now,
            updated_at: now,
        };
        table.rows.push(saved.clone());
        Ok(saved)
    }

    async fn list(&self) -> AppResult<Vec<MissingReport>> {
        Ok(self.table.read().await.rows.clone())
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<MissingReport>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: i32) -> AppResult<Option<MissingReport>> {
        let table = self.table.read().await;
        Ok(table.rows.iter().find(|r| r.id == id).cloned())
    }

    async fn compare_and_set_status(
        &self,
        change: &StatusChange,
    ) -> AppResult<Option<MissingReport>> {
        let mut table = self.table.write().await;

        let Some(row) = table
            .rows
            .iter_mut()
            .find(|r| r.id == change.report_id && r.status == change.from)
        else {
            return Ok(None);
        };

        row.status = change.to;
        row.updated_at = change.at;
        if change.to == ReportStatus::Found {
            row.found_at = Some(change.at);
        }
        let updated = row.clone();

        table.events.push(StatusEvent {
            report_id: change.report_id,
            from: change.from,
            to: change.to,
            officer_id: change.officer_id,
            at: change.at,
        });

        Ok(Some(updated))
    }

    async fn history(&self, report_id: i32) -> AppResult<Vec<StatusEvent>> {
        let table = self.table.read().await;
        Ok(table
            .events
            .iter()
            .filter(|e| e.report_id == report_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct AccountTable {
    next_user_id: i32,
    next_officer_id: i32,
    users: Vec<ReportingUser>,
    officers: Vec<Officer>,
}

#[derive(Default)]
pub struct MemoryAccountRepository {
    table: RwLock<AccountTable>,
}

impl MemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn insert_user(&self, user: NewReportingUser) -> AppResult<ReportingUser> {
        let mut table = self.table.write().await;
        if table.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        table.next_user_id += 1;
        let saved = ReportingUser {
            id: table.next_user_id,
            full_name: user.full_name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            address: user.address,
            date_of_birth: user.date_of_birth,
            emergency_contact: user.emergency_contact,
            emergency_phone: user.emergency_phone,
            created_at: chrono::Utc::now().naive_utc(),
        };
        table.users.push(saved.clone());
        Ok(saved)
    }

    async fn find_user(&self, id: i32) -> AppResult<Option<ReportingUser>> {
        let table = self.table.read().await;
        Ok(table.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<ReportingUser>> {
        let table = self.table.read().await;
        Ok(table.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_users(&self, ids: &[i32]) -> AppResult<Vec<ReportingUser>> {
        let table = self.table.read().await;
        Ok(table
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_officer(&self, new: NewOfficer) -> AppResult<Officer> {
        let mut table = self.table.write().await;
        if table
            .officers
            .iter()
            .any(|o| o.badge_number == new.badge_number)
        {
            return Err(AppError::Conflict(
                "Badge number already registered".to_string(),
            ));
        }

        table.next_officer_id += 1;
        let now = chrono::Utc::now().naive_utc();
        let saved = Officer {
            id: table.next_officer_id,
            badge_number: new.badge_number,
            station: new.station,
            password_hash: new.password_hash,
            approved: new.approved,
            approved_by: None,
            approved_at: new.approved.then_some(now),
            created_at: now,
        };
        table.officers.push(saved.clone());
        Ok(saved)
    }

    async fn find_officer(&self, id: i32) -> AppResult<Option<Officer>> {
        let table = self.table.read().await;
        Ok(table.officers.iter().find(|o| o.id == id).cloned())
    }

    async fn find_officer_by_badge(&self, badge_number: &str) -> AppResult<Option<Officer>> {
        let table = self.table.read().await;
        Ok(table
            .officers
            .iter()
            .find(|o| o.badge_number == badge_number)
            .cloned())
    }

    async fn approve_officer(&self, id: i32, approved_by: Option<i32>) -> AppResult<Officer> {
        let mut table = self.table.write().await;
        let officer = table
            .officers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(AppError::NotFound)?;

        if !officer.approved {
            officer.approved = true;
            officer.approved_by = approved_by;
            officer.approved_at = Some(chrono::Utc::now().naive_utc());
        }
        Ok(officer.clone())
    }
}
