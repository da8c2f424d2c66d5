use crate::{
    domain::{MissingReport, ReportStatus, StatusChange, StatusEvent},
    error::{AppError, AppResult},
    repository::Storage,
};

pub struct TriageService {
    storage: Storage,
}

impl TriageService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Move a report to `target` on behalf of an officer.
    ///
    /// `expected` lets the caller pin the status it last saw; a mismatch is a
    /// `Conflict` and nothing is written.
    pub async fn transition(
        &self,
        officer_id: i32,
        report_id: i32,
        target: ReportStatus,
        expected: Option<ReportStatus>,
    ) -> AppResult<MissingReport> {
        let current = self
            .storage
            .reports
            .find(report_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if let Some(expected) = expected {
            if expected != current.status {
                return Err(AppError::Conflict(format!(
                    "Report {} is {}, not {}",
                    current.case_ref(),
                    current.status,
                    expected
                )));
            }
        }

        if !current.status.can_transition_to(target) {
            return Err(AppError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let change = StatusChange {
            report_id,
            from: current.status,
            to: target,
            officer_id,
            at: chrono::Utc::now().naive_utc(),
        };

        if let Some(updated) = self.storage.reports.compare_and_set_status(&change).await? {
            tracing::info!(
                report_id,
                officer_id,
                from = %change.from,
                to = %change.to,
                "report status changed"
            );
            return Ok(updated);
        }

        // Someone else moved the report between our read and the write.
        let latest = self
            .storage
            .reports
            .find(report_id)
            .await?
            .ok_or(AppError::NotFound)?;
        tracing::warn!(
            report_id,
            officer_id,
            seen = %change.from,
            now = %latest.status,
            "status write lost to a concurrent transition"
        );

        if latest.status.can_transition_to(target) {
            Err(AppError::Conflict(format!(
                "Report {} changed to {} while the update was in flight",
                latest.case_ref(),
                latest.status
            )))
        } else {
            Err(AppError::InvalidTransition {
                from: latest.status,
                to: target,
            })
        }
    }

    pub async fn history(&self, report_id: i32) -> AppResult<Vec<StatusEvent>> {
        if self.storage.reports.find(report_id).await?.is_none() {
            return Err(AppError::NotFound);
        }
        self.storage.reports.history(report_id).await
    }
}
