//! Report submission: form normalization, photo checks and the commit.

use crate::{
    config::upload::UploadConfig,
    domain::{MissingReport, NewReport, ReportSubject, ReporterContact},
    error::{AppError, AppResult},
    repository::Storage,
    services::photo::{check_photo_count, inspect_photo, stored_photo_name, PhotoUpload},
};
use chrono::{DateTime, NaiveDateTime};
use futures_util::future::{join_all, try_join_all};
use serde::Deserialize;

const MAX_PERSON_AGE: u8 = 130;

/// Text fields of a report submission exactly as the client sent them.
///
/// Field names are snake_case; the camelCase names used by the web form are
/// accepted as aliases. Anything else is rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportForm {
    #[serde(alias = "reportType")]
    pub report_type: Option<String>,
    #[serde(alias = "reporterName")]
    pub reporter_name: Option<String>,
    #[serde(alias = "reporterPhone")]
    pub reporter_phone: Option<String>,
    #[serde(alias = "reporterRelation")]
    pub reporter_relation: Option<String>,
    #[serde(alias = "personName")]
    pub person_name: Option<String>,
    #[serde(alias = "personAge")]
    pub person_age: Option<String>,
    #[serde(alias = "personGender")]
    pub person_gender: Option<String>,
    #[serde(alias = "personHeight")]
    pub person_height: Option<String>,
    #[serde(alias = "personClothing")]
    pub person_clothing: Option<String>,
    #[serde(alias = "itemName")]
    pub item_name: Option<String>,
    #[serde(alias = "itemType")]
    pub item_type: Option<String>,
    #[serde(alias = "itemValue")]
    pub item_value: Option<String>,
    #[serde(alias = "itemBrand")]
    pub item_brand: Option<String>,
    #[serde(alias = "itemColor")]
    pub item_color: Option<String>,
    #[serde(alias = "lastSeenLocation")]
    pub last_seen_location: Option<String>,
    #[serde(alias = "lastSeenTime")]
    pub last_seen_time: Option<String>,
    pub description: Option<String>,
}

/// Everything in a submission except the owner and the stored photo names.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub reporter: ReporterContact,
    pub subject: ReportSubject,
    pub last_seen_location: String,
    pub last_seen_at: NaiveDateTime,
    pub description: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts RFC 3339 (offset is converted to UTC) and the naive formats
/// produced by `datetime-local` inputs.
pub fn parse_last_seen(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

impl ReportForm {
    /// Build a form from multipart text parts, rejecting repeated names.
    pub fn from_fields(fields: Vec<(String, String)>) -> AppResult<Self> {
        let mut map = serde_json::Map::new();
        for (name, value) in fields {
            if map.contains_key(&name) {
                return Err(AppError::Validation(format!("Duplicate field: {}", name)));
            }
            map.insert(name, serde_json::Value::String(value));
        }
        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| AppError::Validation(format!("Invalid report fields: {}", e)))
    }

    /// Normalize and check every field, reporting all problems at once.
    pub fn validate(self) -> AppResult<ValidatedForm> {
        let mut problems: Vec<String> = Vec::new();

        let kind = clean(self.report_type).unwrap_or_else(|| "person".to_string());
        let reporter_name = clean(self.reporter_name);
        let reporter_phone = clean(self.reporter_phone);
        let last_seen_location = clean(self.last_seen_location);
        let last_seen_raw = clean(self.last_seen_time);

        if reporter_name.is_none() {
            problems.push("reporter_name is required".to_string());
        }
        if reporter_phone.is_none() {
            problems.push("reporter_phone is required".to_string());
        }

        let subject = match kind.to_ascii_lowercase().as_str() {
            "person" => {
                let age = match clean(self.person_age) {
                    None => None,
                    Some(raw) => match raw.parse::<u8>() {
                        Ok(age) if age <= MAX_PERSON_AGE => Some(age),
                        _ => {
                            problems.push(format!(
                                "person_age must be a whole number between 0 and {}",
                                MAX_PERSON_AGE
                            ));
                            None
                        }
                    },
                };
                match clean(self.person_name) {
                    Some(name) => Some(ReportSubject::Person {
                        name,
                        age,
                        gender: clean(self.person_gender),
                        height: clean(self.person_height),
                        clothing: clean(self.person_clothing),
                    }),
                    None => {
                        problems.push("person_name is required".to_string());
                        None
                    }
                }
            }
            "item" => match clean(self.item_name) {
                Some(name) => Some(ReportSubject::Item {
                    name,
                    category: clean(self.item_type),
                    value: clean(self.item_value),
                    brand: clean(self.item_brand),
                    color: clean(self.item_color),
                }),
                None => {
                    problems.push("item_name is required".to_string());
                    None
                }
            },
            other => {
                problems.push(format!(
                    "report_type must be person or item, got '{}'",
                    other
                ));
                None
            }
        };

        if last_seen_location.is_none() {
            problems.push("last_seen_location is required".to_string());
        }
        let last_seen_at = match last_seen_raw {
            None => {
                problems.push("last_seen_time is required".to_string());
                None
            }
            Some(raw) => {
                let parsed = parse_last_seen(&raw);
                if parsed.is_none() {
                    problems.push(format!(
                        "last_seen_time '{}' is not a valid date and time",
                        raw
                    ));
                }
                parsed
            }
        };

        match (reporter_name, reporter_phone, subject, last_seen_location, last_seen_at) {
            (Some(name), Some(phone), Some(subject), Some(location), Some(at))
                if problems.is_empty() =>
            {
                Ok(ValidatedForm {
                    reporter: ReporterContact {
                        name,
                        phone,
                        relation: clean(self.reporter_relation),
                    },
                    subject,
                    last_seen_location: location,
                    last_seen_at: at,
                    description: clean(self.description),
                })
            }
            _ => Err(AppError::Validation(problems.join("; "))),
        }
    }
}

pub struct ReportService {
    storage: Storage,
    upload: UploadConfig,
}

impl ReportService {
    pub fn new(storage: Storage, upload: UploadConfig) -> Self {
        Self { storage, upload }
    }

    /// Validate, store photos, commit. Photos already written are removed
    /// again when the commit fails.
    pub async fn submit(
        &self,
        user_id: i32,
        form: ReportForm,
        photos: Vec<PhotoUpload>,
    ) -> AppResult<MissingReport> {
        let form = form.validate()?;
        check_photo_count(photos.len())?;

        let extensions = photos
            .iter()
            .enumerate()
            .map(|(i, p)| inspect_photo(p, i, self.upload.max_photo_bytes))
            .collect::<AppResult<Vec<_>>>()?;

        let now_millis = chrono::Utc::now().timestamp_millis();
        let names: Vec<String> = photos
            .iter()
            .zip(&extensions)
            .map(|(p, ext)| stored_photo_name(now_millis, &p.original_name, ext))
            .collect();

        let writes = photos
            .iter()
            .zip(&names)
            .map(|(p, name)| self.storage.photos.put(name, &p.data));
        if let Err(e) = try_join_all(writes).await {
            self.discard_photos(&names).await;
            return Err(e);
        }

        let new_report = NewReport {
            user_id,
            reporter: form.reporter,
            subject: form.subject,
            last_seen_location: form.last_seen_location,
            last_seen_at: form.last_seen_at,
            description: form.description,
            photos: names.clone(),
        };

        match self.storage.reports.insert(new_report).await {
            Ok(report) => {
                tracing::info!(
                    report_id = report.id,
                    user_id,
                    photos = report.photos.len(),
                    "missing report submitted"
                );
                Ok(report)
            }
            Err(e) => {
                self.discard_photos(&names).await;
                Err(e)
            }
        }
    }

    pub async fn list_mine(&self, user_id: i32) -> AppResult<Vec<MissingReport>> {
        self.storage.reports.list_for_user(user_id).await
    }

    async fn discard_photos(&self, names: &[String]) {
        let results = join_all(names.iter().map(|n| self.storage.photos.delete(n))).await;
        for (name, result) in names.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!("Failed to remove orphaned photo {}: {}", name, e);
            }
        }
    }
}
