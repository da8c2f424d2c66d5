use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lifecycle of a missing report.
///
/// `active` is the initial state and `found` is terminal. Officers may move a
/// report `active -> investigating -> found`, or confirm a match directly with
/// `active -> found`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "investigating")]
    Investigating,
    #[sea_orm(string_value = "found")]
    Found,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Active => "active",
            ReportStatus::Investigating => "investigating",
            ReportStatus::Found => "found",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Found)
    }

    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        matches!(
            (self, next),
            (ReportStatus::Active, ReportStatus::Investigating)
                | (ReportStatus::Active, ReportStatus::Found)
                | (ReportStatus::Investigating, ReportStatus::Found)
        )
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(ReportStatus::Active),
            "investigating" => Ok(ReportStatus::Investigating),
            "found" => Ok(ReportStatus::Found),
            other => Err(format!(
                "unknown status '{}', expected active, investigating or found",
                other
            )),
        }
    }
}

/// Dashboard status filter: `all` or one concrete status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReportStatus),
}

impl StatusFilter {
    pub fn admits(self, status: ReportStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        trimmed.parse().map(StatusFilter::Only)
    }
}

/// What went missing. Persons are the common case; festival crowds also lose
/// bags, phones and documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportSubject {
    Person {
        name: String,
        age: Option<u8>,
        gender: Option<String>,
        height: Option<String>,
        clothing: Option<String>,
    },
    Item {
        name: String,
        category: Option<String>,
        value: Option<String>,
        brand: Option<String>,
        color: Option<String>,
    },
}

impl ReportSubject {
    pub fn name(&self) -> &str {
        match self {
            ReportSubject::Person { name, .. } | ReportSubject::Item { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportSubject::Person { .. } => "person",
            ReportSubject::Item { .. } => "item",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReporterContact {
    pub name: String,
    pub phone: String,
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissingReport {
    pub id: i32,
    pub user_id: i32,
    pub reporter: ReporterContact,
    pub subject: ReportSubject,
    pub last_seen_location: String,
    pub last_seen_at: NaiveDateTime,
    pub description: Option<String>,
    /// Stored photo names in submission order.
    pub photos: Vec<String>,
    pub status: ReportStatus,
    pub found_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl MissingReport {
    /// Human-facing case reference, e.g. `MP00042`.
    pub fn case_ref(&self) -> String {
        format!("MP{:05}", self.id)
    }
}

impl AsRef<MissingReport> for MissingReport {
    fn as_ref(&self) -> &MissingReport {
        self
    }
}

/// A validated submission ready to be committed. Status is always `active`.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: i32,
    pub reporter: ReporterContact,
    pub subject: ReportSubject,
    pub last_seen_location: String,
    pub last_seen_at: NaiveDateTime,
    pub description: Option<String>,
    pub photos: Vec<String>,
}

/// Name and email of the account that filed a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterIdentity {
    pub id: i32,
    pub full_name: String,
    pub email: String,
}

/// A report joined with its reporting account.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub report: MissingReport,
    pub reporter: Option<ReporterIdentity>,
}

impl AsRef<MissingReport> for ReportView {
    fn as_ref(&self) -> &MissingReport {
        &self.report
    }
}

/// Conditional status write: applies only while the stored status is `from`.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub report_id: i32,
    pub from: ReportStatus,
    pub to: ReportStatus,
    pub officer_id: i32,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub report_id: i32,
    pub from: ReportStatus,
    pub to: ReportStatus,
    pub officer_id: i32,
    pub at: NaiveDateTime,
}
