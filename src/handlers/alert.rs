use crate::domain::{Alert, AlertKind, NewAlert};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthSession;
use crate::repository::Storage;
use crate::response::ApiResponse;
use crate::services::alert::{AlertFeed, AlertService};
use crate::services::ingestion::parse_last_seen;
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::timestamp;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PublishAlertRequest {
    /// `match`, `sighting` or `emergency`
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[validate(length(min = 1, max = 500))]
    pub message: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    /// Report the alert concerns
    #[serde(alias = "caseId")]
    pub case_id: Option<i32>,
    /// When the event was observed; defaults to now
    pub observed_at: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListAlertsQuery {
    pub case_id: Option<i32>,
    /// Only alerts that are not resolved yet
    pub unresolved: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AlertResponse {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    pub location: String,
    pub case_id: Option<i32>,
    pub observed_at: String,
    pub raised_by: i32,
    pub resolved: bool,
    pub resolved_at: Option<String>,
}

impl From<Alert> for AlertResponse {
    fn from(a: Alert) -> Self {
        Self {
            id: a.id,
            kind: a.kind,
            message: a.message,
            location: a.location,
            case_id: a.case_id,
            observed_at: timestamp(a.observed_at),
            raised_by: a.raised_by,
            resolved: a.resolved,
            resolved_at: a.resolved_at.map(timestamp),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/alerts",
    security(("jwt_token" = [])),
    request_body = PublishAlertRequest,
    responses(
        (status = 201, description = "Alert published", body = AlertResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Officer session required", body = AppError),
    ),
    tag = "alerts"
)]
pub async fn publish_alert(
    Extension(storage): Extension<Storage>,
    Extension(feed): Extension<AlertFeed>,
    session: AuthSession,
    Json(payload): Json<PublishAlertRequest>,
) -> AppResult<impl IntoResponse> {
    let officer_id = session.require_officer()?;
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let kind: AlertKind = payload.kind.parse().map_err(AppError::Validation)?;
    let observed_at = match payload.observed_at.as_deref().map(str::trim) {
        None | Some("") => chrono::Utc::now().naive_utc(),
        Some(raw) => parse_last_seen(raw).ok_or_else(|| {
            AppError::Validation(format!("observed_at '{}' is not a valid date and time", raw))
        })?,
    };

    let alert = AlertService::new(storage, feed)
        .publish(NewAlert {
            kind,
            message: payload.message.trim().to_string(),
            location: payload.location.trim().to_string(),
            case_id: payload.case_id,
            observed_at,
            raised_by: officer_id,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(AlertResponse::from(alert))))
}

#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    security(("jwt_token" = [])),
    params(
        ("case_id" = Option<i32>, Query, description = "Only alerts for this report"),
        ("unresolved" = Option<bool>, Query, description = "Only unresolved alerts"),
    ),
    responses(
        (status = 200, description = "Alert feed, most recent first", body = Vec<AlertResponse>),
        (status = 403, description = "Officer session required", body = AppError),
    ),
    tag = "alerts"
)]
pub async fn list_alerts(
    Extension(storage): Extension<Storage>,
    Extension(feed): Extension<AlertFeed>,
    session: AuthSession,
    Query(query): Query<ListAlertsQuery>,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;
    let alerts: Vec<AlertResponse> = AlertService::new(storage, feed)
        .list(query.case_id, query.unresolved.unwrap_or(false))
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::ok(alerts))
}

#[utoipa::path(
    put,
    path = "/api/v1/alerts/{id}/resolve",
    security(("jwt_token" = [])),
    params(("id" = String, Path, description = "Alert ID")),
    responses(
        (status = 200, description = "Alert resolved", body = AlertResponse),
        (status = 403, description = "Officer session required", body = AppError),
        (status = 404, description = "Alert not found", body = AppError),
    ),
    tag = "alerts"
)]
pub async fn resolve_alert(
    Extension(storage): Extension<Storage>,
    Extension(feed): Extension<AlertFeed>,
    session: AuthSession,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;
    let alert = AlertService::new(storage, feed).resolve(id)?;
    Ok(ApiResponse::ok(AlertResponse::from(alert)))
}
