use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The two kinds of session the service issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Officer,
}

/// A citizen who files reports.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportingUser {
    pub id: i32,
    pub full_name: String,
    /// Always stored trimmed and lower-cased.
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReportingUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

/// A police account. Login is refused until `approved` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Officer {
    pub id: i32,
    pub badge_number: String,
    pub station: String,
    pub password_hash: String,
    pub approved: bool,
    pub approved_by: Option<i32>,
    pub approved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewOfficer {
    pub badge_number: String,
    pub station: String,
    pub password_hash: String,
    pub approved: bool,
}
