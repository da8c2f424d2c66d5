use crate::config::env_flag;
use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::{env, sync::OnceLock};

// Swagger UI needs inline scripts and styles; everything else is JSON or images.
const DEFAULT_CSP_POLICY: &str = "default-src 'self'; base-uri 'self'; frame-ancestors 'none'; object-src 'none'; script-src 'self' 'unsafe-inline'; style-src 'self' 'unsafe-inline'; img-src 'self' data:";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

#[derive(Debug, Clone)]
struct SecurityHeaders {
    csp: HeaderValue,
    hsts: bool,
}

impl SecurityHeaders {
    fn from_env() -> Self {
        let csp = match env::var("CSP_POLICY") {
            Ok(raw) => HeaderValue::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!("Ignoring invalid CSP_POLICY ({}), using the default", err);
                HeaderValue::from_static(DEFAULT_CSP_POLICY)
            }),
            Err(_) => HeaderValue::from_static(DEFAULT_CSP_POLICY),
        };

        Self {
            csp,
            hsts: env_flag("ENABLE_HSTS", true),
        }
    }

    fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(header::CONTENT_SECURITY_POLICY, self.csp.clone());
        headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
        // Control-room dashboards on another origin embed report photos.
        headers.insert(
            "cross-origin-resource-policy",
            HeaderValue::from_static("cross-origin"),
        );

        // Reports carry reporter phone numbers; keep them out of shared caches
        // unless the handler chose a policy itself (photos do).
        if !headers.contains_key(header::CACHE_CONTROL) {
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        }

        if self.hsts {
            headers.insert(
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static(HSTS_VALUE),
            );
        }
    }
}

fn security_headers() -> &'static SecurityHeaders {
    static CONFIG: OnceLock<SecurityHeaders> = OnceLock::new();
    CONFIG.get_or_init(SecurityHeaders::from_env)
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    security_headers().apply(response.headers_mut());
    response
}
