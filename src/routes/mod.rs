use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::config::upload::UploadConfig;
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use axum::{extract::DefaultBodyLimit, middleware, routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes(rate_limit: &RateLimitConfig, upload: &UploadConfig) -> Router {
    Router::new().nest("/api/v1", api_routes(rate_limit, upload))
}

fn api_routes(rate_limit: &RateLimitConfig, upload: &UploadConfig) -> Router {
    let auth = auth_routes(rate_limit);
    let public_read = public_read_routes(rate_limit);
    let protected =
        protected_routes(rate_limit, upload).layer(middleware::from_fn(auth_middleware));

    auth.merge(public_read).merge(protected)
}

/// Registration and login for both account kinds.
fn auth_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        .route(
            "/auth/users/register",
            routing::post(handlers::auth::register_user),
        )
        .route("/auth/users/login", routing::post(handlers::auth::login_user))
        .route(
            "/auth/officers/register",
            routing::post(handlers::auth::register_officer),
        )
        .route(
            "/auth/officers/login",
            routing::post(handlers::auth::login_officer),
        );

    with_optional_rate_limit(router, config.enabled, config.auth)
}

/// Unauthenticated reads. Photo names are unguessable.
fn public_read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new().route(
        "/photos/{filename}",
        routing::get(handlers::photo::get_photo),
    );

    with_optional_rate_limit(router, config.enabled, config.public_read)
}

/// Everything behind a session. Role checks happen in the handlers.
fn protected_routes(config: &RateLimitConfig, upload: &UploadConfig) -> Router {
    let router = Router::new()
        // Accounts
        .route(
            "/auth/me",
            routing::get(handlers::auth::get_current_account),
        )
        .route(
            "/officers/{id}/approve",
            routing::put(handlers::auth::approve_officer),
        )
        // Reports
        .route(
            "/reports",
            routing::post(handlers::report::submit_report)
                .layer(DefaultBodyLimit::max(upload.max_submission_bytes()))
                .get(handlers::report::list_reports),
        )
        .route(
            "/reports/mine",
            routing::get(handlers::report::list_my_reports),
        )
        .route("/reports/{id}", routing::get(handlers::report::get_report))
        .route(
            "/reports/{id}/status",
            routing::put(handlers::report::update_report_status),
        )
        .route(
            "/reports/{id}/history",
            routing::get(handlers::report::get_report_history),
        )
        .route(
            "/reports/{id}/alerts",
            routing::get(handlers::report::get_report_alerts),
        )
        // Dashboard
        .route(
            "/dashboard/summary",
            routing::get(handlers::dashboard::get_summary),
        )
        // Alerts
        .route(
            "/alerts",
            routing::post(handlers::alert::publish_alert).get(handlers::alert::list_alerts),
        )
        .route(
            "/alerts/{id}/resolve",
            routing::put(handlers::alert::resolve_alert),
        );

    with_optional_rate_limit(router, config.enabled, config.protected)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let Some(governor_conf) = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
    else {
        tracing::warn!(
            "Rejected rate limit rule {}:{}, serving without a limit",
            rule.per_second,
            rule.burst_size
        );
        return router;
    };

    router.layer(GovernorLayer::new(governor_conf))
}
