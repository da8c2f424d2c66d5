pub mod alert;
pub mod auth;
pub mod dashboard;
pub mod photo;
pub mod report;

pub use auth::*;

use chrono::NaiveDateTime;

/// Wire format for every timestamp in responses.
pub(crate) fn timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}
