use crate::config::dashboard::DashboardConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthSession;
use crate::repository::Storage;
use crate::response::ApiResponse;
use crate::services::alert::AlertFeed;
use crate::services::search::{summarize, DashboardSummary};
use crate::services::SearchService;
use axum::{response::IntoResponse, Extension};

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Dashboard counters", body = DashboardSummary),
        (status = 403, description = "Officer session required", body = AppError),
    ),
    tag = "dashboard"
)]
pub async fn get_summary(
    Extension(storage): Extension<Storage>,
    Extension(config): Extension<DashboardConfig>,
    Extension(feed): Extension<AlertFeed>,
    session: AuthSession,
) -> AppResult<impl IntoResponse> {
    session.require_officer()?;

    let reports = SearchService::new(storage).all_reports().await?;
    let summary = summarize(
        &reports,
        chrono::Utc::now(),
        config.offset(),
        feed.unresolved_count(),
        config.cameras_online,
    );
    Ok(ApiResponse::ok(summary))
}
