use crate::config::upload::UploadConfig;
use crate::domain::{
    MissingReport, ReportStatus, ReportSubject, ReportView, ReporterIdentity, StatusEvent,
    StatusFilter,
};
use crate::error::{AppError, AppResult};
use crate::middleware::AuthSession;
use crate::repository::Storage;
use crate::response::{ApiResponse, PaginatedResponse, PaginationQuery};
use crate::services::alert::{AlertFeed, AlertService};
use crate::services::ingestion::ReportForm;
use crate::services::photo::PhotoUpload;
use crate::services::{ReportService, SearchService, TriageService};
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::alert::AlertResponse;
use super::timestamp;

const PHOTO_FIELD: &str = "photos";

#[derive(Debug, Serialize, ToSchema)]
pub struct ReporterAccountResponse {
    pub id: i32,
    pub full_name: String,
    pub email: String,
}

impl From<ReporterIdentity> for ReporterAccountResponse {
    fn from(r: ReporterIdentity) -> Self {
        Self {
            id: r.id,
            full_name: r.full_name,
            email: r.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    /// Report ID
    pub id: i32,
    /// Human-facing case reference, e.g. MP00042
    pub case_ref: String,
    pub status: ReportStatus,
    pub subject: ReportSubject,
    pub reporter_name: String,
    pub reporter_phone: String,
    pub reporter_relation: Option<String>,
    pub last_seen_location: String,
    pub last_seen_time: String,
    pub description: Option<String>,
    /// Stored photo names in submission order
    pub photos: Vec<String>,
    /// Fetch URLs for `photos`, same order
    pub photo_urls: Vec<String>,
    /// ID of the filing account
    pub user_id: i32,
    /// Filing account, resolved for officer views
    pub user: Option<ReporterAccountResponse>,
    pub found_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<MissingReport> for ReportResponse {
    fn from(r: MissingReport) -> Self {
        let case_ref = r.case_ref();
        let photo_urls = r
            .photos
            .iter()
            .map(|p| format!("/api/v1/photos/{}", p))
            .collect();
        Self {
            id: r.id,
            case_ref,
            status: r.status,
            subject: r.subject,
            reporter_name: r.reporter.name,
            reporter_phone: r.reporter.phone,
            reporter_relation: r.reporter.relation,
            last_seen_location: r.last_seen_location,
            last_seen_time: timestamp(r.last_seen_at),
            description: r.description,
            photos: r.photos,
            photo_urls,
            user_id: r.user_id,
            user: None,
            found_at: r.found_at.map(timestamp),
            created_at: timestamp(r.created_at),
            updated_at: timestamp(r.updated_at),
        }
    }
}

impl From<ReportView> for ReportResponse {
    fn from(view: ReportView) -> Self {
        let mut response = ReportResponse::from(view.report);
        response.user = view.reporter.map(Into::into);
        response
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListReportsQuery {
    /// Case-insensitive match on subject name or case reference
    pub search: Option<String>,
    /// `all` (default), `active`, `investigating` or `found`
    pub status: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target status
    pub status: String,
    /// Status the caller last saw; the update is refused if it changed
    pub expected_status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusEventResponse {
    pub from: ReportStatus,
    pub to: ReportStatus,
    pub officer_id: i32,
    pub at: String,
}

impl From<StatusEvent> for StatusEventResponse {
    fn from(e: StatusEvent) -> Self {
        Self {
            from: e.from,
            to: e.to,
            officer_id: e.officer_id,
            at: timestamp(e.at),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaseAlertsResponse {
    pub case_id: i32,
    /// Most recent alert for the case
    pub latest: Option<AlertResponse>,
    /// Every alert for the case, newest first
    pub alerts: Vec<AlertResponse>,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("Failed to read upload: {}", e.body_text()))
    }
}

fn parse_status(raw: &str, field: &str) -> AppResult<ReportStatus> {
    raw.parse()
        .map_err(|e: String| AppError::Validation(format!("{}: {}", field, e)))
}

#[utoipa::path(
    post,
    path = "/api/v1/reports",
    security(("jwt_token" = [])),
    request_body(content_type = "multipart/form-data", description = "Report fields plus up to 5 `photos` files"),
    responses(
        (status = 201, description = "Report submitted", body = ReportResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Reporting-user session required", body = AppError),
        (status = 413, description = "Photo too large", body = AppError),
        (status = 503, description = "Storage unavailable", body = AppError),
    ),
    tag = "reports"
)]
pub async fn submit_report(
    Extension(storage): Extension<Storage>,
    Extension(upload): Extension<UploadConfig>,
    session: AuthSession,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user_id = session.require_reporting_user()?;

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut photos: Vec<PhotoUpload> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PHOTO_FIELD {
            let original_name = field.file_name().unwrap_or("photo").to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            photos.push(PhotoUpload {
                original_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.push((name, value));
        }
    }

    let form = ReportForm::from_fields(fields)?;
    let service = ReportService::new(storage, upload);
    let report = service.submit(user_id, form, photos).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            ReportResponse::from(report),
            "Report submitted.".to_string(),
        ),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/mine",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Reports filed by the caller", body = Vec<ReportResponse>),
        (status = 403, description = "Reporting-user session required", body = AppError),
    ),
    tag = "reports"
)]
pub async fn list_my_reports(
    Extension(storage): Extension<Storage>,
    Extension(upload): Extension<UploadConfig>,
    session: AuthSession,
) -> AppResult<impl IntoResponse> {
    let user_id = session.require_reporting_user()?;
    let service = ReportService::new(storage, upload);
    let reports: Vec<ReportResponse> = service
        .list_mine(user_id)
        .await?
        .into_iter()
        .map(ReportResponse::from)
        .collect();
    Ok(ApiResponse::ok(reports))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    security(("jwt_token" = [])),
    params(
        ("search" = Option<String>, Query, description = "Match on subject name or case reference"),
        ("status" = Option<String>, Query, description = "all, active, investigating or found"),
        ("page" = Option<u64>, Query, description = "Page number (default 1)"),
        ("per_page" = Option<u64>, Query, description = "Items per page (default 20, max 100)"),
    ),
    responses(
        (status = 200, description = "Matching reports in filing order", body = PaginatedResponse<ReportResponse>),
        (status = 400, description = "Unknown status filter", body = AppError),
        (status = 403, description = "Officer session required", body = AppError),
    ),
    tag = "reports"
)]
pub async fn list_reports(
    Extension(storage): Extension<Storage>,
    session: AuthSession,
    Query(query): Query<ListReportsQuery>,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;

    let filter: StatusFilter = query
        .status
        .as_deref()
        .unwrap_or("")
        .parse()
        .map_err(|e: String| AppError::Validation(format!("status: {}", e)))?;
    let term = query.search.unwrap_or_default();

    let service = SearchService::new(storage);
    let views = service.search(&term, filter).await?;

    let pagination = PaginationQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let page = pagination.paginate(views, ReportResponse::from);
    Ok(ApiResponse::ok(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report", body = ReportResponse),
        (status = 403, description = "Officer session required", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "reports"
)]
pub async fn get_report(
    Extension(storage): Extension<Storage>,
    session: AuthSession,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;
    let view = SearchService::new(storage).get(id).await?;
    Ok(ApiResponse::ok(ReportResponse::from(view)))
}

#[utoipa::path(
    put,
    path = "/api/v1/reports/{id}/status",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ReportResponse),
        (status = 400, description = "Unknown status", body = AppError),
        (status = 403, description = "Officer session required", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
        (status = 409, description = "Status changed concurrently", body = AppError),
        (status = 422, description = "Transition not allowed", body = AppError),
    ),
    tag = "reports"
)]
pub async fn update_report_status(
    Extension(storage): Extension<Storage>,
    session: AuthSession,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let officer_id = session.require_officer()?;
    let target = parse_status(&payload.status, "status")?;
    let expected = payload
        .expected_status
        .as_deref()
        .map(|raw| parse_status(raw, "expected_status"))
        .transpose()?;

    let report = TriageService::new(storage)
        .transition(officer_id, id, target, expected)
        .await?;
    Ok(ApiResponse::ok(ReportResponse::from(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/history",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Applied transitions, oldest first", body = Vec<StatusEventResponse>),
        (status = 403, description = "Officer session required", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "reports"
)]
pub async fn get_report_history(
    Extension(storage): Extension<Storage>,
    session: AuthSession,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;
    let events: Vec<StatusEventResponse> = TriageService::new(storage)
        .history(id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(ApiResponse::ok(events))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}/alerts",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Alerts correlated with the case", body = CaseAlertsResponse),
        (status = 403, description = "Officer session required", body = AppError),
        (status = 404, description = "Report not found", body = AppError),
    ),
    tag = "reports"
)]
pub async fn get_report_alerts(
    Extension(storage): Extension<Storage>,
    Extension(feed): Extension<AlertFeed>,
    session: AuthSession,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;
    let (latest, alerts) = AlertService::new(storage, feed).for_case(id).await?;
    Ok(ApiResponse::ok(CaseAlertsResponse {
        case_id: id,
        latest: latest.map(Into::into),
        alerts: alerts.into_iter().map(Into::into).collect(),
    }))
}
