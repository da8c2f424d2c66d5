mod common;

use common::{JPEG_BYTES, PNG_BYTES};
use serde_json::Value;

#[tokio::test]
async fn test_submit_person_report() {
    let app = common::spawn_app().await;
    let (user_id, token) = common::create_test_user(&app).await;

    let form = common::report_form(
        &common::person_fields("Raj Kumar"),
        &[("grandpa.jpg", JPEG_BYTES)],
    );
    let (status, body) = common::post_report(&app, &token, form).await;

    assert_eq!(status, 201, "{}", body);
    let report = &body["data"];
    assert_eq!(report["status"], "active");
    assert_eq!(report["user_id"], user_id);
    assert_eq!(report["subject"]["kind"], "person");
    assert_eq!(report["subject"]["name"], "Raj Kumar");
    assert_eq!(report["subject"]["age"], 72);
    assert_eq!(report["last_seen_location"], "Temple");
    assert_eq!(report["last_seen_time"], "2025-01-01T10:00:00");
    assert!(report["found_at"].is_null());
    assert!(report["case_ref"].as_str().unwrap().starts_with("MP"));

    let photos = report["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 1);
    let name = photos[0].as_str().unwrap();
    assert!(name.ends_with("-grandpa.jpg"), "unexpected name {}", name);
    assert_eq!(
        report["photo_urls"][0].as_str().unwrap(),
        format!("/api/v1/photos/{}", name)
    );
}

#[tokio::test]
async fn test_submit_accepts_camel_case_fields() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let fields = vec![
        ("reportType", "item".to_string()),
        ("reporterName", "Meera".to_string()),
        ("reporterPhone", "99999".to_string()),
        ("itemName", "Red backpack".to_string()),
        ("itemColor", "red".to_string()),
        ("lastSeenLocation", "Ghat 3".to_string()),
        ("lastSeenTime", "2025-01-02T08:30:00+05:30".to_string()),
    ];
    let (status, body) = common::post_report(&app, &token, common::report_form(&fields, &[])).await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["data"]["subject"]["kind"], "item");
    assert_eq!(body["data"]["subject"]["color"], "red");
    // Offsets are normalized to UTC
    assert_eq!(body["data"]["last_seen_time"], "2025-01-02T03:00:00");
    assert_eq!(body["data"]["photos"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_submit_rejects_unknown_field() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let mut fields = common::person_fields("Raj Kumar");
    fields.push(("is_admin", "true".to_string()));
    let (status, _) = common::post_report(&app, &token, common::report_form(&fields, &[])).await;

    assert_eq!(status, 400);
    assert!(app.storage.reports.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_lists_every_missing_field() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let fields = vec![("report_type", "person".to_string())];
    let (status, body) = common::post_report(&app, &token, common::report_form(&fields, &[])).await;

    assert_eq!(status, 400);
    let message = body["error"].as_str().unwrap();
    for field in [
        "reporter_name",
        "reporter_phone",
        "person_name",
        "last_seen_location",
        "last_seen_time",
    ] {
        assert!(message.contains(field), "{} missing from {}", field, message);
    }
}

#[tokio::test]
async fn test_submit_rejects_six_photos() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let photos: Vec<(&str, &[u8])> = (0..6).map(|_| ("p.jpg", JPEG_BYTES)).collect();
    let form = common::report_form(&common::person_fields("Raj Kumar"), &photos);
    let (status, _) = common::post_report(&app, &token, form).await;

    assert_eq!(status, 400);
    assert!(app.storage.reports.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_keeps_five_photos_in_order() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let photos: Vec<(&str, &[u8])> = vec![
        ("one.jpg", JPEG_BYTES),
        ("two.png", PNG_BYTES),
        ("three.jpg", JPEG_BYTES),
        ("four.png", PNG_BYTES),
        ("five.jpg", JPEG_BYTES),
    ];
    let form = common::report_form(&common::person_fields("Raj Kumar"), &photos);
    let (status, body) = common::post_report(&app, &token, form).await;

    assert_eq!(status, 201, "{}", body);
    let names: Vec<&str> = body["data"]["photos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 5);
    for (name, stem) in names.iter().zip(["one.jpg", "two.png", "three.jpg", "four.png", "five.jpg"]) {
        assert!(name.ends_with(&format!("-{}", stem)), "{} should end with {}", name, stem);
    }
}

#[tokio::test]
async fn test_submit_rejects_non_image_upload() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let form = common::report_form(
        &common::person_fields("Raj Kumar"),
        &[("notes.jpg", &b"definitely not an image"[..])],
    );
    let (status, _) = common::post_report(&app, &token, form).await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_uploaded_photo_can_be_fetched() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let form = common::report_form(
        &common::person_fields("Raj Kumar"),
        &[("face.png", PNG_BYTES)],
    );
    let (_, body) = common::post_report(&app, &token, form).await;
    let url = body["data"]["photo_urls"][0].as_str().unwrap().to_string();

    let resp = app
        .client
        .get(format!("{}{}", app.addr, url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "image/png");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), PNG_BYTES);

    let resp = app
        .client
        .get(app.url("/photos/does-not-exist.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_officer_cannot_submit_reports() {
    let app = common::spawn_app().await;
    let (_, officer_token) = common::create_approved_officer(&app).await;

    let form = common::report_form(&common::person_fields("Raj Kumar"), &[]);
    let (status, _) = common::post_report(&app, &officer_token, form).await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn test_list_mine_only_returns_own_reports() {
    let app = common::spawn_app().await;
    let (_, alice) = common::create_test_user(&app).await;
    let (_, bob) = common::create_test_user(&app).await;

    let first = common::submit_person_report(&app, &alice, "Raj Kumar").await;
    let second = common::submit_person_report(&app, &alice, "Sita Devi").await;
    common::submit_person_report(&app, &bob, "Unrelated Person").await;

    let (status, body) = common::get_json(&app, &alice, "/reports/mine").await;
    assert_eq!(status, 200);
    let ids: Vec<i64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first as i64, second as i64]);
}

#[tokio::test]
async fn test_reporting_user_cannot_list_all_reports() {
    let app = common::spawn_app().await;
    let (_, token) = common::create_test_user(&app).await;

    let (status, body): (u16, Value) = common::get_json(&app, &token, "/reports").await;
    assert_eq!(status, 403);
    assert_eq!(body["kind"], "forbidden");
}
