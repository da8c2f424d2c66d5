use super::{AccountRepository, ReportRepository};
use crate::domain::{
    MissingReport, NewOfficer, NewReport, NewReportingUser, Officer, ReportStatus,
    ReportSubject, ReporterContact, ReportingUser, StatusChange, StatusEvent,
};
use crate::error::{AppError, AppResult};
use crate::models::{missing_report, officer, report_photo, report_status_event, reporting_user};
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, SqlErr, TransactionTrait,
};
use std::collections::HashMap;

pub struct SeaOrmReportRepository {
    db: DatabaseConnection,
}

impl SeaOrmReportRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn report_from_model(model: missing_report::Model, photos: Vec<String>) -> AppResult<MissingReport> {
    let id = model.id;
    let subject: ReportSubject = serde_json::from_value(model.subject).map_err(|e| {
        AppError::Storage(format!("report {} has an unreadable subject: {}", id, e))
    })?;

    Ok(MissingReport {
        id,
        user_id: model.user_id,
        reporter: ReporterContact {
            name: model.reporter_name,
            phone: model.reporter_phone,
            relation: model.reporter_relation,
        },
        subject,
        last_seen_location: model.last_seen_location,
        last_seen_at: model.last_seen_at,
        description: model.description,
        photos,
        status: model.status,
        found_at: model.found_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

/// Attach photo filenames to each report, batch-loaded on `conn`.
async fn with_photos<C: ConnectionTrait>(
    conn: &C,
    models: Vec<missing_report::Model>,
) -> AppResult<Vec<MissingReport>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let rows = report_photo::Entity::find()
        .filter(report_photo::Column::ReportId.is_in(ids))
        .order_by_asc(report_photo::Column::ReportId)
        .order_by_asc(report_photo::Column::Position)
        .all(conn)
        .await?;

    let mut by_report: HashMap<i32, Vec<String>> = HashMap::new();
    for row in rows {
        by_report.entry(row.report_id).or_default().push(row.filename);
    }

    models
        .into_iter()
        .map(|m| {
            let photos = by_report.remove(&m.id).unwrap_or_default();
            report_from_model(m, photos)
        })
        .collect()
}

#[async_trait]
impl ReportRepository for SeaOrmReportRepository {
    async fn insert(&self, report: NewReport) -> AppResult<MissingReport> {
        let NewReport {
            user_id,
            reporter,
            subject,
            last_seen_location,
            last_seen_at,
            description,
            photos,
        } = report;

        let subject_json =
            serde_json::to_value(&subject).map_err(|e| AppError::Internal(e.into()))?;
        let now = chrono::Utc::now().naive_utc();

        let txn = self.db.begin().await?;

        let saved = missing_report::ActiveModel {
            user_id: Set(user_id),
            reporter_name: Set(reporter.name),
            reporter_phone: Set(reporter.phone),
            reporter_relation: Set(reporter.relation),
            subject_kind: Set(subject.kind().to_string()),
            subject_name: Set(subject.name().to_string()),
            subject: Set(subject_json),
            last_seen_location: Set(last_seen_location),
            last_seen_at: Set(last_seen_at),
            description: Set(description),
            status: Set(ReportStatus::Active),
            found_at: Set(None),
            status_updated_by: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (position, filename) in photos.iter().enumerate() {
            report_photo::ActiveModel {
                report_id: Set(saved.id),
                position: Set(position as i32),
                filename: Set(filename.clone()),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;

        report_from_model(saved, photos)
    }

    async fn list(&self) -> AppResult<Vec<MissingReport>> {
        let models = missing_report::Entity::find()
            .order_by_asc(missing_report::Column::Id)
            .all(&self.db)
            .await?;
        with_photos(&self.db, models).await
    }

    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<MissingReport>> {
        let models = missing_report::Entity::find()
            .filter(missing_report::Column::UserId.eq(user_id))
            .order_by_asc(missing_report::Column::Id)
            .all(&self.db)
            .await?;
        with_photos(&self.db, models).await
    }

    async fn find(&self, id: i32) -> AppResult<Option<MissingReport>> {
        let Some(model) = missing_report::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(with_photos(&self.db, vec![model]).await?.pop())
    }

    async fn compare_and_set_status(
        &self,
        change: &StatusChange,
    ) -> AppResult<Option<MissingReport>> {
        let txn = self.db.begin().await?;

        let mut patch = missing_report::ActiveModel {
            status: Set(change.to),
            status_updated_by: Set(Some(change.officer_id)),
            updated_at: Set(change.at),
            ..Default::default()
        };
        if change.to == ReportStatus::Found {
            patch.found_at = Set(Some(change.at));
        }

        // The status predicate makes this a conditional write: a concurrent
        // transition that commits first leaves zero rows to update here.
        let result = missing_report::Entity::update_many()
            .set(patch)
            .filter(missing_report::Column::Id.eq(change.report_id))
            .filter(missing_report::Column::Status.eq(change.from))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        report_status_event::ActiveModel {
            report_id: Set(change.report_id),
            from_status: Set(change.from),
            to_status: Set(change.to),
            officer_id: Set(change.officer_id),
            created_at: Set(change.at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Read back under the row lock taken by the update, so the caller
        // sees exactly the transition it applied.
        let updated = missing_report::Entity::find_by_id(change.report_id)
            .one(&txn)
            .await?
            .ok_or(AppError::NotFound)?;
        let report = with_photos(&txn, vec![updated]).await?.pop();

        txn.commit().await?;

        Ok(report)
    }

    async fn history(&self, report_id: i32) -> AppResult<Vec<StatusEvent>> {
        let rows = report_status_event::Entity::find()
            .filter(report_status_event::Column::ReportId.eq(report_id))
            .order_by_asc(report_status_event::Column::Id)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| StatusEvent {
                report_id: row.report_id,
                from: row.from_status,
                to: row.to_status,
                officer_id: row.officer_id,
                at: row.created_at,
            })
            .collect())
    }

    async fn ping(&self) -> bool {
        self.db.ping().await.is_ok()
    }
}

pub struct SeaOrmAccountRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Map a unique-index violation to `Conflict`; the lookup done before insert
/// cannot see a row committed concurrently by another request.
fn unique_conflict(err: DbErr, message: &str) -> AppError {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Database(err)
    }
}

fn user_from_model(model: reporting_user::Model) -> ReportingUser {
    ReportingUser {
        id: model.id,
        full_name: model.full_name,
        email: model.email,
        password_hash: model.password_hash,
        phone: model.phone,
        address: model.address,
        date_of_birth: model.date_of_birth,
        emergency_contact: model.emergency_contact,
        emergency_phone: model.emergency_phone,
        created_at: model.created_at,
    }
}

fn officer_from_model(model: officer::Model) -> Officer {
    Officer {
        id: model.id,
        badge_number: model.badge_number,
        station: model.station,
        password_hash: model.password_hash,
        approved: model.approved,
        approved_by: model.approved_by,
        approved_at: model.approved_at,
        created_at: model.created_at,
    }
}

#[async_trait]
impl AccountRepository for SeaOrmAccountRepository {
    async fn insert_user(&self, user: NewReportingUser) -> AppResult<ReportingUser> {
        let now = chrono::Utc::now().naive_utc();
        let model = reporting_user::ActiveModel {
            full_name: Set(user.full_name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            phone: Set(user.phone),
            address: Set(user.address),
            date_of_birth: Set(user.date_of_birth),
            emergency_contact: Set(user.emergency_contact),
            emergency_phone: Set(user.emergency_phone),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| unique_conflict(e, "Email already registered"))?;

        Ok(user_from_model(model))
    }

    async fn find_user(&self, id: i32) -> AppResult<Option<ReportingUser>> {
        let model = reporting_user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_from_model))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<ReportingUser>> {
        let model = reporting_user::Entity::find()
            .filter(reporting_user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(user_from_model))
    }

    async fn find_users(&self, ids: &[i32]) -> AppResult<Vec<ReportingUser>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = reporting_user::Entity::find()
            .filter(reporting_user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(user_from_model).collect())
    }

    async fn insert_officer(&self, new: NewOfficer) -> AppResult<Officer> {
        let now = chrono::Utc::now().naive_utc();
        let model = officer::ActiveModel {
            badge_number: Set(new.badge_number),
            station: Set(new.station),
            password_hash: Set(new.password_hash),
            approved: Set(new.approved),
            approved_by: Set(None),
            approved_at: Set(new.approved.then_some(now)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| unique_conflict(e, "Badge number already registered"))?;

        Ok(officer_from_model(model))
    }

    async fn find_officer(&self, id: i32) -> AppResult<Option<Officer>> {
        let model = officer::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(officer_from_model))
    }

    async fn find_officer_by_badge(&self, badge_number: &str) -> AppResult<Option<Officer>> {
        let model = officer::Entity::find()
            .filter(officer::Column::BadgeNumber.eq(badge_number))
            .one(&self.db)
            .await?;
        Ok(model.map(officer_from_model))
    }

    async fn approve_officer(&self, id: i32, approved_by: Option<i32>) -> AppResult<Officer> {
        let existing = officer::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.approved {
            return Ok(officer_from_model(existing));
        }

        let mut active: officer::ActiveModel = existing.into();
        active.approved = Set(true);
        active.approved_by = Set(approved_by);
        active.approved_at = Set(Some(chrono::Utc::now().naive_utc()));
        let updated = active.update(&self.db).await?;

        Ok(officer_from_model(updated))
    }
}
