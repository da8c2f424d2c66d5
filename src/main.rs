use axum::{
    extract::Extension, middleware::from_fn, response::IntoResponse, routing::get, Json, Router,
};
use melawatch::config::{
    self, auth::AuthConfig, dashboard::DashboardConfig, jwt::JwtConfig,
    rate_limit::RateLimitConfig, storage::StorageBackend, upload::UploadConfig,
};
use melawatch::middleware::security::security_headers_middleware;
use melawatch::repository::Storage;
use melawatch::services::alert::AlertFeed;
use melawatch::services::bootstrap_officer::{ensure_bootstrap_officer, BootstrapOfficerConfig};
use melawatch::{handlers, migration, routes, utils};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Accounts
        handlers::auth::register_user,
        handlers::auth::login_user,
        handlers::auth::register_officer,
        handlers::auth::login_officer,
        handlers::auth::get_current_account,
        handlers::auth::approve_officer,
        // Reports
        handlers::report::submit_report,
        handlers::report::list_my_reports,
        handlers::report::list_reports,
        handlers::report::get_report,
        handlers::report::update_report_status,
        handlers::report::get_report_history,
        handlers::report::get_report_alerts,
        // Dashboard
        handlers::dashboard::get_summary,
        // Alerts
        handlers::alert::publish_alert,
        handlers::alert::list_alerts,
        handlers::alert::resolve_alert,
        // Photos
        handlers::photo::get_photo,
    ),
    components(
        schemas(
            melawatch::response::ApiResponse<serde_json::Value>,
            melawatch::response::PaginatedResponse<serde_json::Value>,
            melawatch::error::AppError,
            melawatch::domain::ReportStatus,
            melawatch::domain::ReportSubject,
            melawatch::domain::AlertKind,
            melawatch::domain::Role,
            handlers::auth::RegisterUserRequest,
            handlers::auth::LoginUserRequest,
            handlers::auth::RegisterOfficerRequest,
            handlers::auth::LoginOfficerRequest,
            handlers::auth::UserResponse,
            handlers::auth::OfficerResponse,
            handlers::auth::SessionResponse,
            handlers::auth::MeResponse,
            handlers::report::ReportResponse,
            handlers::report::ReporterAccountResponse,
            handlers::report::UpdateStatusRequest,
            handlers::report::StatusEventResponse,
            handlers::report::CaseAlertsResponse,
            handlers::alert::PublishAlertRequest,
            handlers::alert::AlertResponse,
            melawatch::services::search::DashboardSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and officer approval"),
        (name = "reports", description = "Report submission, search and triage"),
        (name = "dashboard", description = "Officer dashboard counters"),
        (name = "alerts", description = "Volatile alert feed"),
        (name = "photos", description = "Stored report photos"),
    )
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "melawatch=debug,tower_http=debug,axum=debug".into());

    let json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let fmt_layer = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    // Validate configuration before doing anything else
    let settings = Settings::from_env()?;
    utils::jwt::init_jwt_config(settings.jwt.clone())?;

    tracing::info!("Starting melawatch v{}...", env!("CARGO_PKG_VERSION"));

    let storage = match settings.backend {
        StorageBackend::Postgres => {
            let db = config::database::get_database().await?;
            tracing::info!("Database connected successfully");
            migration::Migrator::up(&db, None).await?;
            tracing::info!("Database migrations applied successfully");
            Storage::postgres(db, &settings.upload.upload_dir)
        }
        StorageBackend::Memory => {
            tracing::warn!("STORAGE_BACKEND=memory: reports and accounts are lost on restart");
            Storage::memory_with_disk_photos(&settings.upload.upload_dir)
        }
    };

    if let Some(cfg) = BootstrapOfficerConfig::from_env() {
        ensure_bootstrap_officer(&storage, &cfg).await?;
    }

    let feed = AlertFeed::new(settings.dashboard.alert_feed_capacity);

    let app = create_app(&settings).layer(
        ServiceBuilder::new()
            .layer(Extension(storage))
            .layer(Extension(feed))
            .layer(Extension(settings.auth))
            .layer(Extension(settings.upload.clone()))
            .layer(Extension(settings.dashboard)),
    );

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Startup configuration, validated fail-fast.
struct Settings {
    jwt: JwtConfig,
    backend: StorageBackend,
    auth: AuthConfig,
    upload: UploadConfig,
    dashboard: DashboardConfig,
    rate_limit: RateLimitConfig,
}

impl Settings {
    fn from_env() -> anyhow::Result<Self> {
        let jwt = JwtConfig::from_env()?;
        let backend = StorageBackend::from_env()?;

        if backend == StorageBackend::Postgres && env::var("DATABASE_URL").is_err() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL environment variable must be set"
            ));
        }

        let upload = UploadConfig::from_env();
        std::fs::create_dir_all(&upload.upload_dir).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create upload directory '{}': {}",
                upload.upload_dir,
                e
            )
        })?;

        Ok(Self {
            jwt,
            backend,
            auth: AuthConfig::from_env(),
            upload,
            dashboard: DashboardConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
        })
    }
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app(settings: &Settings) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes(&settings.rate_limit, &settings.upload))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(Extension(storage): Extension<Storage>) -> impl IntoResponse {
    let storage_ok = storage.reports.ping().await;
    let status = if storage_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "melawatch",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage_ok,
    }))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
