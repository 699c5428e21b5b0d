//! API Integration Tests

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::util::ServiceExt;

mod common;

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, password: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(password) = password {
        builder = builder.header("X-Admin-Password", password);
    }
    builder.body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn body_text(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let test = common::setup_test_app().await;

    let response = test.app.clone().oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "OK");
}

#[tokio::test]
async fn test_survey_flow_e2e() {
    let test = common::setup_test_app().await;
    let app = test.app.clone();

    // 1. Submit an estimate
    let response = app
        .clone()
        .oneshot(post_json("/api/v1/entries", json!({ "amount": "500.00" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED, "Entry creation failed");
    assert!(response.headers().contains_key("x-correlation-id"));

    let created = body_json(response).await;
    let entry_id = created["entry_id"].as_i64().unwrap();
    assert_eq!(created["amount"], "500.00");
    assert_eq!(
        created["contact_url"],
        format!(
            "{}/?view=thank_you_with_contact_option&entry_id={}",
            common::BASE_URL,
            entry_id
        )
    );

    // 2. Leave contact details
    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/api/v1/entries/{}/contact", entry_id),
            json!({ "name": "Erika", "company": "ACME", "email": "erika@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "Attach contact failed");

    let entry = body_json(response).await;
    assert_eq!(entry["has_contact"], true);
    assert_eq!(entry["name"], "Erika");
    assert_eq!(entry["phone"], Value::Null);

    // 3. Total includes the entry, contact did not change it
    let response = app.clone().oneshot(get("/api/v1/total")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let total = body_json(response).await;
    assert_eq!(total["total"], "500.00");
    assert_eq!(total["share"], "50.00");
    assert_eq!(total["total_display"], "500,00 €");
    assert_eq!(total["share_display"], "50,00 €");
}

#[tokio::test]
async fn test_invalid_amounts_rejected() {
    let test = common::setup_test_app().await;

    for amount in ["-5.0", "abc", "1.234", ""] {
        let response = test
            .app
            .clone()
            .oneshot(post_json("/api/v1/entries", json!({ "amount": amount })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "amount {:?}", amount);

        let body = body_json(response).await;
        assert_eq!(body["error_code"], "invalid_amount");
    }

    assert_eq!(test.service.count_entries().await.unwrap(), 0);
}

#[tokio::test]
async fn test_contact_for_unknown_entry() {
    let test = common::setup_test_app().await;

    let response = test
        .app
        .clone()
        .oneshot(post_json(
            "/api/v1/entries/4242/contact",
            json!({ "name": "Ghost" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error_code"], "entry_not_found");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_survey_link() {
    let test = common::setup_test_app().await;

    let response = test
        .app
        .clone()
        .oneshot(get("/api/v1/survey-link"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body["survey_url"],
        format!("{}/?view=survey_form", common::BASE_URL)
    );
}

#[tokio::test]
async fn test_admin_routes_require_password() {
    let test = common::setup_test_app().await;
    test.service.create_entry(dec!(100)).await.unwrap();

    let routes = [
        ("POST", "/api/v1/admin/reset"),
        ("GET", "/api/v1/admin/entries"),
        ("GET", "/api/v1/admin/contacts"),
        ("GET", "/api/v1/admin/entries.csv"),
        ("GET", "/api/v1/admin/contacts.csv"),
    ];

    for (method, uri) in routes {
        for password in [None, Some("wrong")] {
            let response = test
                .app
                .clone()
                .oneshot(admin_request(method, uri, password))
                .await
                .unwrap();
            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{} {} with {:?}",
                method,
                uri,
                password
            );
        }
    }

    // Nothing was reset
    assert_eq!(test.service.get_total().await.unwrap(), dec!(100));
}

#[tokio::test]
async fn test_admin_reset_and_listings() {
    let test = common::setup_test_app().await;
    let app = test.app.clone();
    let password = Some(common::ADMIN_PASSWORD);

    let first = test.service.create_entry(dec!(1000.0)).await.unwrap();
    let second = test.service.create_entry(dec!(2500.0)).await.unwrap();
    test.service
        .attach_contact(
            first,
            live_survey::ContactDetails::new().with_name("Max"),
        )
        .await
        .unwrap();

    // Reset
    let response = app
        .clone()
        .oneshot(admin_request("POST", "/api/v1/admin/reset", password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["total"], "0.00");

    // All entries, newest first
    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/v1/admin/entries", password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let entries = body_json(response).await;
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], second);
    assert_eq!(entries[1]["id"], first);

    // Only the entry with contact details
    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/v1/admin/contacts", password))
        .await
        .unwrap();
    let contacts = body_json(response).await;
    let contacts = contacts.as_array().unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0]["id"], first);
    assert_eq!(contacts[0]["name"], "Max");
}

#[tokio::test]
async fn test_admin_csv_exports() {
    let test = common::setup_test_app().await;
    let app = test.app.clone();
    let password = Some(common::ADMIN_PASSWORD);

    let id = test.service.create_entry(dec!(1234.50)).await.unwrap();
    test.service
        .attach_contact(
            id,
            live_survey::ContactDetails::new()
                .with_name("Erika")
                .with_company("ACME"),
        )
        .await
        .unwrap();
    test.service.create_entry(dec!(10)).await.unwrap();

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/v1/admin/entries.csv", password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("umfrage_alle_eintraege.csv"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ID,Volumen (€),Name,Firma,E-Mail,Telefon,Zeitpunkt");
    assert!(lines[1].starts_with("2,\"10,00\",-,-,-,-,"));
    assert!(lines[2].starts_with("1,\"1.234,50\",Erika,ACME,-,-,"));

    let response = app
        .clone()
        .oneshot(admin_request("GET", "/api/v1/admin/contacts.csv", password))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("umfrage_kontaktdaten.csv"));

    let csv = body_text(response).await;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("1,Erika,ACME,,,\"1.234,50 €\","));
}

#[tokio::test]
async fn test_presenter_refresh() {
    let test = common::setup_test_app().await;
    let feed = test.poller.feed();
    let mut readings = feed.subscribe();
    let wait = std::time::Duration::from_secs(5);

    // Initial poll
    tokio::time::timeout(wait, readings.wait_for(|r| r.is_available()))
        .await
        .unwrap()
        .unwrap();

    test.service.create_entry(dec!(3500)).await.unwrap();

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/presenter/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    tokio::time::timeout(wait, readings.wait_for(|r| r.total() == Some(dec!(3500))))
        .await
        .unwrap()
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(get("/api/v1/presenter"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let view = body_json(response).await;
    assert_eq!(view["available"], true);
    assert_eq!(view["total_display"], "3.500,00 €");
    assert_eq!(view["share_display"], "350,00 €");
    assert_eq!(view["refresh_interval_secs"], 3600);
}
