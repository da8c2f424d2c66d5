#![allow(dead_code)]

use melawatch::config::{
    auth::AuthConfig, dashboard::DashboardConfig, rate_limit::RateLimitConfig,
    upload::UploadConfig,
};
use melawatch::repository::Storage;
use melawatch::services::alert::AlertFeed;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Once,
};

static INIT: Once = Once::new();
static ACCOUNT_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Smallest byte string the upload checks accept as a JPEG.
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
pub const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn init_env() {
    INIT.call_once(|| {
        let config = melawatch::config::jwt::JwtConfig {
            secret: "integration_test_secret_that_is_at_least_32_characters_long".to_string(),
            session_expiry: 3600,
        };
        let _ = melawatch::utils::jwt::init_jwt_config(config);
    });
}

pub struct TestApp {
    pub addr: String,
    pub storage: Storage,
    pub feed: AlertFeed,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(AuthConfig::default(), DashboardConfig::default()).await
}

pub async fn spawn_app_with(auth: AuthConfig, dashboard: DashboardConfig) -> TestApp {
    init_env();

    let storage = Storage::in_memory();
    let feed = AlertFeed::new(dashboard.alert_feed_capacity);
    let upload = UploadConfig {
        upload_dir: "./test_uploads".to_string(),
        max_photo_bytes: 64 * 1024,
    };

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(melawatch::routes::create_routes(
            &RateLimitConfig::disabled(),
            &upload,
        ))
        .layer(axum::middleware::from_fn(
            melawatch::middleware::security::security_headers_middleware,
        ))
        .layer(axum::extract::Extension(storage.clone()))
        .layer(axum::extract::Extension(feed.clone()))
        .layer(axum::extract::Extension(auth))
        .layer(axum::extract::Extension(upload))
        .layer(axum::extract::Extension(dashboard));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        storage,
        feed,
        client: Client::new(),
    }
}

fn next_suffix() -> usize {
    ACCOUNT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Register a reporting user with the given email and return (user_id, token).
pub async fn register_and_login_user(app: &TestApp, email: &str) -> (i32, String) {
    let resp = app
        .client
        .post(app.url("/auth/users/register"))
        .json(&serde_json::json!({
            "full_name": "Test Reporter",
            "email": email,
            "password": "test_password_123",
            "phone": "+91 98765 43210"
        }))
        .send()
        .await
        .expect("Failed to register user");
    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse register response");
    assert_eq!(status, 201, "register failed: {}", body);

    let resp = app
        .client
        .post(app.url("/auth/users/login"))
        .json(&serde_json::json!({
            "email": email,
            "password": "test_password_123"
        }))
        .send()
        .await
        .expect("Failed to log in user");
    let body: Value = resp.json().await.expect("Failed to parse login response");
    assert!(body["success"].as_bool().unwrap_or(false), "login failed: {}", body);

    let user_id = body["data"]["account_id"]
        .as_i64()
        .expect("Login response missing account_id") as i32;
    let token = body["data"]["token"]
        .as_str()
        .expect("Login response missing token")
        .to_string();
    (user_id, token)
}

/// Register a user with a generated email.
pub async fn create_test_user(app: &TestApp) -> (i32, String) {
    let email = format!("reporter{}@example.com", next_suffix());
    register_and_login_user(app, &email).await
}

/// Register an officer, approve it directly in storage and log in.
/// Returns (officer_id, token).
pub async fn create_approved_officer(app: &TestApp) -> (i32, String) {
    let badge = format!("KMB-{:04}", next_suffix());
    let station = "Sector 4 Control Room";

    let resp = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&serde_json::json!({
            "badge_number": badge,
            "station": station,
            "password": "officer_password_1"
        }))
        .send()
        .await
        .expect("Failed to register officer");
    let body: Value = resp.json().await.expect("Failed to parse register response");
    let officer_id = body["data"]["id"]
        .as_i64()
        .expect("Officer response missing id") as i32;

    app.storage
        .accounts
        .approve_officer(officer_id, None)
        .await
        .expect("Failed to approve officer");

    let resp = app
        .client
        .post(app.url("/auth/officers/login"))
        .json(&serde_json::json!({
            "badge_number": badge,
            "station": station,
            "password": "officer_password_1"
        }))
        .send()
        .await
        .expect("Failed to log in officer");
    let body: Value = resp.json().await.expect("Failed to parse login response");
    let token = body["data"]["token"]
        .as_str()
        .unwrap_or_else(|| panic!("Officer login failed: {}", body))
        .to_string();
    (officer_id, token)
}

/// Text fields of a valid person report.
pub fn person_fields(name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("report_type", "person".to_string()),
        ("reporter_name", "Alice".to_string()),
        ("reporter_phone", "+91 90000 00001".to_string()),
        ("reporter_relation", "daughter".to_string()),
        ("person_name", name.to_string()),
        ("person_age", "72".to_string()),
        ("last_seen_location", "Temple".to_string()),
        ("last_seen_time", "2025-01-01T10:00".to_string()),
    ]
}

pub fn report_form(fields: &[(&str, String)], photos: &[(&str, &[u8])]) -> Form {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.to_string(), value.clone());
    }
    for (file_name, data) in photos {
        let part = Part::bytes(data.to_vec()).file_name(file_name.to_string());
        form = form.part("photos", part);
    }
    form
}

/// POST a report form and return (status, body).
pub async fn post_report(app: &TestApp, token: &str, form: Form) -> (u16, Value) {
    let resp = app
        .client
        .post(app.url("/reports"))
        .bearer_auth(token)
        .multipart(form)
        .send()
        .await
        .expect("Failed to submit report");
    let status = resp.status().as_u16();
    let body: Value = resp.json().await.expect("Failed to parse report response");
    (status, body)
}

/// Submit a person report with one JPEG and return the report id.
pub async fn submit_person_report(app: &TestApp, token: &str, name: &str) -> i32 {
    let form = report_form(&person_fields(name), &[("photo.jpg", JPEG_BYTES)]);
    let (status, body) = post_report(app, token, form).await;
    assert_eq!(status, 201, "submit failed: {}", body);
    body["data"]["id"].as_i64().expect("Report response missing id") as i32
}

/// PUT a status change and return (status, body).
pub async fn set_status(app: &TestApp, token: &str, report_id: i32, status: &str) -> (u16, Value) {
    let resp = app
        .client
        .put(app.url(&format!("/reports/{}/status", report_id)))
        .bearer_auth(token)
        .json(&serde_json::json!({ "status": status }))
        .send()
        .await
        .expect("Failed to update status");
    let code = resp.status().as_u16();
    let body: Value = resp.json().await.expect("Failed to parse status response");
    (code, body)
}

pub async fn get_json(app: &TestApp, token: &str, path: &str) -> (u16, Value) {
    let resp = app
        .client
        .get(app.url(path))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to send request");
    let code = resp.status().as_u16();
    let body: Value = resp.json().await.expect("Failed to parse response");
    (code, body)
}
