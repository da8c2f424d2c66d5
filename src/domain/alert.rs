use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Match,
    Sighting,
    Emergency,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertKind::Match => "match",
            AlertKind::Sighting => "sighting",
            AlertKind::Emergency => "emergency",
        })
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "match" => Ok(AlertKind::Match),
            "sighting" => Ok(AlertKind::Sighting),
            "emergency" => Ok(AlertKind::Emergency),
            other => Err(format!(
                "unknown alert type '{}', expected match, sighting or emergency",
                other
            )),
        }
    }
}

/// A volatile feed entry. Alerts live only in process memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub kind: AlertKind,
    pub message: String,
    pub location: String,
    /// Report this alert concerns, if any.
    pub case_id: Option<i32>,
    pub observed_at: NaiveDateTime,
    pub raised_by: i32,
    pub resolved: bool,
    pub resolved_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewAlert {
    pub kind: AlertKind,
    pub message: String,
    pub location: String,
    pub case_id: Option<i32>,
    pub observed_at: NaiveDateTime,
    pub raised_by: i32,
}
