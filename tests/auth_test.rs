mod common;

use melawatch::config::{auth::AuthConfig, dashboard::DashboardConfig};
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_user_normalizes_email() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/users/register"))
        .json(&json!({
            "fullName": "Alice Sharma",
            "email": "Alice@Example.COM",
            "password": "correct_horse_1",
            "phone": "+91 90000 00001"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("password_hash").is_none());

    // Logging in with a different casing still works
    let resp = app
        .client
        .post(app.url("/auth/users/login"))
        .json(&json!({ "email": "ALICE@example.com", "password": "correct_horse_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let app = common::spawn_app().await;
    common::register_and_login_user(&app, "dup@example.com").await;

    let resp = app
        .client
        .post(app.url("/auth/users/register"))
        .json(&json!({
            "full_name": "Someone Else",
            "email": "DUP@example.com",
            "password": "another_pass_1",
            "phone": "12345"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "conflict");
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/users/register"))
        .json(&json!({
            "full_name": "Bob",
            "email": "bob@example.com",
            "password": "short",
            "phone": "12345"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn test_login_wrong_password_is_unauthorized() {
    let app = common::spawn_app().await;
    common::register_and_login_user(&app, "carol@example.com").await;

    let resp = app
        .client
        .post(app.url("/auth/users/login"))
        .json(&json!({ "email": "carol@example.com", "password": "wrong_password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .post(app.url("/auth/users/login"))
        .json(&json!({ "email": "nobody@example.com", "password": "whatever_123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_unapproved_officer_cannot_log_in() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&json!({
            "badgeNumber": "UP-1001",
            "station": "Triveni Sangam",
            "password": "officer_pass_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["approved"], false);

    let login = json!({
        "badge_number": "UP-1001",
        "station": "Triveni Sangam",
        "password": "officer_pass_1"
    });

    let resp = app
        .client
        .post(app.url("/auth/officers/login"))
        .json(&login)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Wrong password is still reported as bad credentials, not as pending approval
    let resp = app
        .client
        .post(app.url("/auth/officers/login"))
        .json(&json!({
            "badge_number": "UP-1001",
            "station": "Triveni Sangam",
            "password": "not_the_password"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_officer_approves_another_officer() {
    let app = common::spawn_app().await;
    let (_, approver_token) = common::create_approved_officer(&app).await;

    let resp = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&json!({
            "badge_number": "UP-2002",
            "station": "Sector 9",
            "password": "officer_pass_2"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let pending_id = body["data"]["id"].as_i64().unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/officers/{}/approve", pending_id)))
        .bearer_auth(&approver_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["approved"], true);
    assert!(body["data"]["approved_at"].is_string());

    let resp = app
        .client
        .post(app.url("/auth/officers/login"))
        .json(&json!({
            "badge_number": "UP-2002",
            "station": "Sector 9",
            "password": "officer_pass_2"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_reporting_user_cannot_approve_officers() {
    let app = common::spawn_app().await;
    let (_, user_token) = common::create_test_user(&app).await;

    let resp = app
        .client
        .put(app.url("/officers/1/approve"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn test_duplicate_badge_conflicts() {
    let app = common::spawn_app().await;
    let payload = json!({
        "badge_number": "UP-3003",
        "station": "Sector 1",
        "password": "officer_pass_3"
    });

    let first = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let second = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
}

#[tokio::test]
async fn test_auto_approve_lets_officer_log_in_immediately() {
    let app = common::spawn_app_with(
        AuthConfig {
            auto_approve_officers: true,
        },
        DashboardConfig::default(),
    )
    .await;

    let resp = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&json!({
            "badge_number": "UP-4004",
            "station": "Sector 2",
            "password": "officer_pass_4"
        }))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["approved"], true);

    let resp = app
        .client
        .post(app.url("/auth/officers/login"))
        .json(&json!({
            "badge_number": "UP-4004",
            "station": "Sector 2",
            "password": "officer_pass_4"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_me_endpoint_reports_role() {
    let app = common::spawn_app().await;
    let (user_id, user_token) = common::create_test_user(&app).await;
    let (officer_id, officer_token) = common::create_approved_officer(&app).await;

    let (status, body) = common::get_json(&app, &user_token, "/auth/me").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["user"]["id"], user_id);
    assert!(body["data"]["officer"].is_null());

    let (status, body) = common::get_json(&app, &officer_token, "/auth/me").await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["role"], "officer");
    assert_eq!(body["data"]["officer"]["id"], officer_id);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/auth/me")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client
        .get(app.url("/auth/me"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn test_register_rejects_blank_profile_fields() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/auth/users/register"))
        .json(&json!({
            "full_name": "   ",
            "email": "blank@example.com",
            "password": "correct_horse_1",
            "phone": "   "
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "validation_error");

    let resp = app
        .client
        .post(app.url("/auth/officers/register"))
        .json(&json!({
            "badgeNumber": "UP-2001",
            "station": "   ",
            "password": "officer_pass_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Nothing was stored, so the same email registers cleanly afterwards
    let resp = app
        .client
        .post(app.url("/auth/users/register"))
        .json(&json!({
            "full_name": "Blank Fixed",
            "email": "blank@example.com",
            "password": "correct_horse_1",
            "phone": "12345"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
}
