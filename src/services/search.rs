//! Dashboard views over the report set.

use crate::{
    domain::{MissingReport, ReportStatus, ReportView, ReporterIdentity, StatusFilter},
    error::{AppError, AppResult},
    repository::Storage,
};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

/// Reports whose subject name or case reference contains `term`
/// (case-insensitive) and whose status passes `filter`, in input order.
/// The term is matched as given: whitespace is not trimmed, so `" "` only
/// matches names containing a space.
pub fn query<'a, T: AsRef<MissingReport>>(
    items: &'a [T],
    term: &str,
    filter: StatusFilter,
) -> Vec<&'a T> {
    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| {
            let report: &MissingReport = (*item).as_ref();
            filter.admits(report.status) && matches_term(report, &needle)
        })
        .collect()
}

fn matches_term(report: &MissingReport, needle: &str) -> bool {
    needle.is_empty()
        || report.subject.name().to_lowercase().contains(needle)
        || report.case_ref().to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_reports: usize,
    pub active_cases: usize,
    pub investigating_cases: usize,
    /// Reports marked found since local midnight.
    pub found_today: usize,
    pub unresolved_alerts: usize,
    pub cameras_online: u32,
}

pub fn summarize(
    reports: &[MissingReport],
    now: DateTime<Utc>,
    offset: FixedOffset,
    unresolved_alerts: usize,
    cameras_online: u32,
) -> DashboardSummary {
    let today = now.with_timezone(&offset).date_naive();
    let count = |status: ReportStatus| reports.iter().filter(|r| r.status == status).count();

    let found_today = reports
        .iter()
        .filter(|r| r.status == ReportStatus::Found)
        .filter_map(|r| r.found_at)
        .filter(|at| at.and_utc().with_timezone(&offset).date_naive() == today)
        .count();

    DashboardSummary {
        total_reports: reports.len(),
        active_cases: count(ReportStatus::Active),
        investigating_cases: count(ReportStatus::Investigating),
        found_today,
        unresolved_alerts,
        cameras_online,
    }
}

pub struct SearchService {
    storage: Storage,
}

impl SearchService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Filtered reports with the filing account resolved.
    pub async fn search(&self, term: &str, filter: StatusFilter) -> AppResult<Vec<ReportView>> {
        let reports = self.storage.reports.list().await?;
        let matched: Vec<MissingReport> = query(&reports, term, filter).into_iter().cloned().collect();
        self.with_reporters(matched).await
    }

    pub async fn get(&self, id: i32) -> AppResult<ReportView> {
        let report = self
            .storage
            .reports
            .find(id)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut views = self.with_reporters(vec![report]).await?;
        views.pop().ok_or(AppError::NotFound)
    }

    pub async fn all_reports(&self) -> AppResult<Vec<MissingReport>> {
        self.storage.reports.list().await
    }

    async fn with_reporters(&self, reports: Vec<MissingReport>) -> AppResult<Vec<ReportView>> {
        let mut ids: Vec<i32> = reports.iter().map(|r| r.user_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let users: HashMap<i32, ReporterIdentity> = self
            .storage
            .accounts
            .find_users(&ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    ReporterIdentity {
                        id: u.id,
                        full_name: u.full_name,
                        email: u.email,
                    },
                )
            })
            .collect();

        Ok(reports
            .into_iter()
            .map(|report| ReportView {
                reporter: users.get(&report.user_id).cloned(),
                report,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportSubject, ReporterContact};
    use chrono::{NaiveDate, TimeZone};

    fn report(id: i32, name: &str, status: ReportStatus) -> MissingReport {
        let at = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        MissingReport {
            id,
            user_id: 1,
            reporter: ReporterContact {
                name: "Alice".into(),
                phone: "1".into(),
                relation: None,
            },
            subject: ReportSubject::Person {
                name: name.into(),
                age: None,
                gender: None,
                height: None,
                clothing: None,
            },
            last_seen_location: "Temple".into(),
            last_seen_at: at,
            description: None,
            photos: vec![],
            status,
            found_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn sample() -> Vec<MissingReport> {
        vec![
            report(1, "Raj Kumar", ReportStatus::Active),
            report(2, "Priya Sharma", ReportStatus::Found),
            report(3, "RAJESH", ReportStatus::Investigating),
            report(4, "Anil", ReportStatus::Found),
        ]
    }

    fn ids(found: &[&MissingReport]) -> Vec<i32> {
        found.iter().map(|r| r.id).collect()
    }

    #[test]
    fn term_matches_name_case_insensitively() {
        let reports = sample();
        assert_eq!(ids(&query(&reports, "raj", StatusFilter::All)), vec![1, 3]);
        assert_eq!(ids(&query(&reports, "RaJ", StatusFilter::All)), vec![1, 3]);
    }

    #[test]
    fn whitespace_in_term_is_literal() {
        let reports = sample();
        assert_eq!(ids(&query(&reports, " ", StatusFilter::All)), vec![1, 2]);
        assert!(query(&reports, " raj ", StatusFilter::All).is_empty());
    }

    #[test]
    fn term_matches_case_reference() {
        let reports = sample();
        assert_eq!(ids(&query(&reports, "mp00004", StatusFilter::All)), vec![4]);
        assert_eq!(ids(&query(&reports, "MP0000", StatusFilter::All)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn status_filter_and_empty_term() {
        let reports = sample();
        assert_eq!(
            ids(&query(&reports, "", StatusFilter::Only(ReportStatus::Found))),
            vec![2, 4]
        );
        assert_eq!(
            ids(&query(&reports, "raj", StatusFilter::Only(ReportStatus::Found))),
            Vec::<i32>::new()
        );
        assert_eq!(ids(&query(&reports, "", StatusFilter::All)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let reports = sample();
        let first = ids(&query(&reports, "a", StatusFilter::All));
        let second = ids(&query(&reports, "a", StatusFilter::All));
        assert_eq!(first, second);
    }

    #[test]
    fn found_today_uses_the_local_day() {
        let ist = FixedOffset::east_opt(330 * 60).unwrap();
        // 2025-01-02 01:00 IST
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 19, 30, 0).unwrap();

        let mut reports = sample();
        // 2025-01-02 00:30 IST: today
        reports[1].found_at = Some(
            Utc.with_ymd_and_hms(2025, 1, 1, 19, 0, 0)
                .unwrap()
                .naive_utc(),
        );
        // 2025-01-01 23:00 IST: yesterday
        reports[3].found_at = Some(
            Utc.with_ymd_and_hms(2025, 1, 1, 17, 30, 0)
                .unwrap()
                .naive_utc(),
        );

        let summary = summarize(&reports, now, ist, 3, 247);
        assert_eq!(
            summary,
            DashboardSummary {
                total_reports: 4,
                active_cases: 1,
                investigating_cases: 1,
                found_today: 1,
                unresolved_alerts: 3,
                cameras_online: 247,
            }
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(summarize(&reports, now, utc, 0, 0).found_today, 2);
    }
}
