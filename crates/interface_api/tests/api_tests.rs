//! HTTP API Tests
//!
//! Drive the full router over an in-memory store with a pinned clock.

use std::str::FromStr;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use core_kernel::FixedClock;
use domain_enrollment::{EnrollmentService, EnrollmentStore, InMemoryEnrollmentStore, NewPayment, PaymentMethod};
use interface_api::config::{ApiConfig, StoreKind};
use interface_api::{create_router, AppState};
use test_utils::{date, DateFixtures};

struct TestApp {
    server: TestServer,
    store: InMemoryEnrollmentStore,
}

impl TestApp {
    /// Router over an empty store whose clock reads `today`
    fn on(today: NaiveDate) -> Self {
        let store = InMemoryEnrollmentStore::new();
        let service = EnrollmentService::new(Arc::new(store.clone()), Arc::new(FixedClock(today)));
        let config = ApiConfig {
            store: StoreKind::Memory,
            delinquency_sweep_secs: 0,
            ..Default::default()
        };
        let server = TestServer::new(create_router(AppState::new(service, config)))
            .expect("test server");
        Self { server, store }
    }

    async fn create_student(&self, body: Value) -> Value {
        let response = self.server.post("/api/v1/students").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }
}

fn amount(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        other => Decimal::from_str(&other.to_string()).expect("decimal number"),
    }
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::on(DateFixtures::mid_window());

    let response = app.server.get("/api/v1/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");

    let response = app.server.get("/api/v1/health/ready").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store"], "memory-enrollment-store");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = TestApp::on(DateFixtures::mid_window());
    let response = app.server.get("/api/v1/health").await;
    let id = response.header("x-request-id");
    assert!(!id.is_empty());
}

// ============================================================================
// Students
// ============================================================================

#[tokio::test]
async fn test_create_student_with_enrollment_date() {
    let app = TestApp::on(date(2024, 1, 15));
    let body = app
        .create_student(json!({
            "name": "Maria Silva",
            "city": "Fortaleza",
            "state": "CE",
            "enrolled_on": "2024-01-01",
            "due_on": "2030-12-31"
        }))
        .await;

    assert_eq!(body["name"], "Maria Silva");
    assert_eq!(body["enrolled_on"], "2024-01-01");
    assert_eq!(body["due_on"], "2024-01-31");
    assert!(body["disenrolled_on"].is_null());
    assert_eq!(body["is_active"], true);
    assert_eq!(body["status"], "active");
    assert_eq!(body["payments"], json!([]));
}

#[tokio::test]
async fn test_create_student_requires_name() {
    let app = TestApp::on(DateFixtures::mid_window());

    let response = app.server.post("/api/v1/students").json(&json!({"city": "Crato"})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>();
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "name");

    let response = app.server.post("/api/v1/students").json(&json!({"name": "  "})).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["details"][0]["field"], "name");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::on(DateFixtures::mid_window());
    let response = app
        .server
        .post("/api/v1/students")
        .bytes("{\"name\": ".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_path_and_query_use_error_body() {
    let app = TestApp::on(DateFixtures::mid_window());
    for path in ["/api/v1/students/abc", "/api/v1/payments/abc", "/api/v1/students?limit=many"] {
        let response = app.server.get(path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "bad_request");
    }
}

#[tokio::test]
async fn test_unknown_student_is_not_found() {
    let app = TestApp::on(DateFixtures::mid_window());
    let response = app.server.get("/api/v1/students/4242").await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"], "not_found");
}

#[tokio::test]
async fn test_enroll_payment_reload_round_trip() {
    let app = TestApp::on(date(2024, 1, 10));
    let created = app
        .create_student(json!({"name": "Ana", "address": "Rua A, 1", "phone": "85 9999"}))
        .await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["status"], "unenrolled");

    let response = app.server.post(&format!("/api/v1/students/{id}/enroll")).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["date"], "2024-01-10");
    assert_eq!(body["student"]["due_on"], "2024-02-09");

    let response = app
        .server
        .post(&format!("/api/v1/students/{id}/payments"))
        .json(&json!({"amount": "150.00", "method": "card"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let payment = response.json::<Value>();
    assert_eq!(payment["date"], "2024-01-10");
    assert_eq!(payment["student_id"], id);

    let reloaded = app.server.get(&format!("/api/v1/students/{id}")).await.json::<Value>();
    assert_eq!(reloaded["name"], "Ana");
    assert_eq!(reloaded["address"], "Rua A, 1");
    assert_eq!(reloaded["phone"], "85 9999");
    assert_eq!(reloaded["is_active"], true);
    assert_eq!(reloaded["payments"].as_array().unwrap().len(), 1);
    assert_eq!(amount(&reloaded["payments"][0]["amount"]), Decimal::new(150, 0));
}

#[tokio::test]
async fn test_update_student_patch_semantics() {
    let app = TestApp::on(date(2024, 3, 1));
    let created = app
        .create_student(json!({"name": "Ana", "city": "Crato", "enrolled_on": "2024-02-20"}))
        .await;
    let id = created["id"].as_i64().unwrap();

    let body = app
        .server
        .put(&format!("/api/v1/students/{id}"))
        .json(&json!({"city": "Sobral"}))
        .await
        .json::<Value>();
    assert_eq!(body["city"], "Sobral");
    assert_eq!(body["enrolled_on"], "2024-02-20");

    let body = app
        .server
        .put(&format!("/api/v1/students/{id}"))
        .json(&json!({"enrolled_on": "2024-02-25"}))
        .await
        .json::<Value>();
    assert_eq!(body["due_on"], "2024-03-26");

    let body = app
        .server
        .put(&format!("/api/v1/students/{id}"))
        .json(&json!({"enrolled_on": null}))
        .await
        .json::<Value>();
    assert!(body["enrolled_on"].is_null());
    assert!(body["due_on"].is_null());
    assert_eq!(body["status"], "unenrolled");

    let response = app
        .server
        .put(&format!("/api/v1/students/{id}"))
        .json(&json!({"name": ""}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_delete_requires_disenrollment_and_cascades() {
    let app = TestApp::on(date(2024, 1, 10));
    let created = app.create_student(json!({"name": "Ana", "enrolled_on": "2024-01-01"})).await;
    let id = created["id"].as_i64().unwrap();
    app.server
        .post(&format!("/api/v1/students/{id}/payments"))
        .json(&json!({"amount": 80, "method": "cash", "date": "2024-01-05"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app.server.delete(&format!("/api/v1/students/{id}")).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "precondition_failed");

    let response = app.server.post(&format!("/api/v1/students/{id}/disenroll")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["date"], "2024-01-10");

    app.server
        .delete(&format!("/api/v1/students/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/api/v1/students/{id}"))
        .await
        .assert_status_not_found();
    assert_eq!(app.store.payment_count().await, 0);
}

#[tokio::test]
async fn test_delete_never_enrolled_student_is_rejected() {
    let app = TestApp::on(DateFixtures::mid_window());
    let id = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();
    app.server
        .delete(&format!("/api/v1/students/{id}"))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_students_filters() {
    let app = TestApp::on(date(2024, 1, 15));
    app.create_student(json!({"name": "Ana", "state": "CE", "enrolled_on": "2024-01-01"})).await;
    app.create_student(json!({"name": "Bia", "state": "CE"})).await;
    app.create_student(json!({"name": "Caio", "state": "SP", "enrolled_on": "2024-01-01"})).await;

    let names = |body: Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap().to_string())
            .collect()
    };

    let all = app.server.get("/api/v1/students").await.json::<Value>();
    assert_eq!(names(all), vec!["Ana", "Bia", "Caio"]);

    let ce = app.server.get("/api/v1/students?state=CE").await.json::<Value>();
    assert_eq!(names(ce), vec!["Ana", "Bia"]);

    let active = app.server.get("/api/v1/students?active=true").await.json::<Value>();
    assert_eq!(names(active), vec!["Ana", "Caio"]);

    let page = app
        .server
        .get("/api/v1/students?active=true&limit=1&offset=1")
        .await
        .json::<Value>();
    assert_eq!(names(page), vec!["Caio"]);
}

// ============================================================================
// Delinquency
// ============================================================================

#[tokio::test]
async fn test_delinquency_without_payment_disenrolls() {
    let app = TestApp::on(date(2024, 2, 5));
    let id = app
        .create_student(json!({"name": "Ana", "enrolled_on": "2024-01-01"}))
        .await["id"]
        .as_i64()
        .unwrap();

    let response = app.server.post(&format!("/api/v1/students/{id}/delinquency")).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["outcome"], "disenrolled");
    assert_eq!(body["disenrolled_on"], "2024-02-05");
    assert_eq!(body["student"]["status"], "disenrolled");
}

#[tokio::test]
async fn test_delinquency_with_recent_payment_extends() {
    let app = TestApp::on(date(2024, 2, 5));
    let id = app
        .create_student(json!({"name": "Ana", "enrolled_on": "2024-01-01"}))
        .await["id"]
        .as_i64()
        .unwrap();

    // Store the payment without the record_payment side effects
    let student = app.store.load_student(id.into()).await.unwrap();
    let payment = NewPayment::new(student.id, date(2024, 1, 20), Decimal::new(100, 0), PaymentMethod::Cash).unwrap();
    app.store.insert_payment(&student, payment).await.unwrap();

    let body = app
        .server
        .post(&format!("/api/v1/students/{id}/delinquency"))
        .await
        .json::<Value>();
    assert_eq!(body["outcome"], "extended");
    assert_eq!(body["due_on"], "2024-02-19");
    assert!(body["student"]["disenrolled_on"].is_null());
    assert_eq!(body["student"]["is_active"], true);
}

#[tokio::test]
async fn test_delinquency_sweep_reports_counts() {
    let app = TestApp::on(date(2024, 2, 5));
    app.create_student(json!({"name": "Ana", "enrolled_on": "2024-01-01"})).await;
    app.create_student(json!({"name": "Bia", "enrolled_on": "2024-01-20"})).await;
    app.create_student(json!({"name": "Caio"})).await;

    let body = app
        .server
        .post("/api/v1/students/delinquency-sweep")
        .await
        .json::<Value>();
    assert_eq!(body, json!({"examined": 1, "extended": 0, "disenrolled": 1, "failed": 0}));
}

// ============================================================================
// Payments
// ============================================================================

#[tokio::test]
async fn test_negative_amount_is_rejected_without_persisting() {
    let app = TestApp::on(date(2024, 1, 10));
    let id = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();

    let response = app
        .server
        .post(&format!("/api/v1/students/{id}/payments"))
        .json(&json!({"amount": -1, "method": "cash"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["details"][0]["field"], "amount");

    assert_eq!(app.store.payment_count().await, 0);
    let student = app.server.get(&format!("/api/v1/students/{id}")).await.json::<Value>();
    assert!(student["enrolled_on"].is_null());
}

#[tokio::test]
async fn test_amount_outside_storage_precision_is_rejected() {
    let app = TestApp::on(date(2024, 1, 10));
    let id = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();

    for amount in ["10.005", "12345678901"] {
        let response = app
            .server
            .post("/api/v1/payments")
            .json(&json!({"student_id": id, "amount": amount, "method": "card"}))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["details"][0]["field"], "amount");
    }
    assert_eq!(app.store.payment_count().await, 0);

    let response = app
        .server
        .post("/api/v1/payments")
        .json(&json!({"student_id": id, "amount": "9999999999.99", "method": "card"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    assert_eq!(amount(&response.json::<Value>()["amount"]), Decimal::new(999_999_999_999, 2));
}

#[tokio::test]
async fn test_invalid_method_is_rejected() {
    let app = TestApp::on(date(2024, 1, 10));
    let id = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();

    let response = app
        .server
        .post("/api/v1/payments")
        .json(&json!({"student_id": id, "amount": 10, "method": "pix"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["details"][0]["field"], "method");
}

#[tokio::test]
async fn test_payments_endpoint_requires_student_id() {
    let app = TestApp::on(date(2024, 1, 10));
    let response = app
        .server
        .post("/api/v1/payments")
        .json(&json!({"amount": 10, "method": "cash"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["details"][0]["field"], "student_id");
}

#[tokio::test]
async fn test_unknown_student_wins_over_invalid_payload() {
    let app = TestApp::on(date(2024, 1, 10));
    let response = app
        .server
        .post("/api/v1/payments")
        .json(&json!({"student_id": 999, "amount": -5}))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_first_payment_enrolls_student() {
    let app = TestApp::on(date(2024, 1, 10));
    let id = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();

    app.server
        .post("/api/v1/payments")
        .json(&json!({"student_id": id, "amount": "99.90", "method": "cash", "date": "2024-01-08"}))
        .await
        .assert_status(StatusCode::CREATED);

    let student = app.server.get(&format!("/api/v1/students/{id}")).await.json::<Value>();
    assert_eq!(student["enrolled_on"], "2024-01-08");
    assert_eq!(student["due_on"], "2024-02-07");
    assert_eq!(student["status"], "active");
}

#[tokio::test]
async fn test_payment_update_and_delete_leave_student_alone() {
    let app = TestApp::on(date(2024, 1, 10));
    let id = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();
    let payment = app
        .server
        .post(&format!("/api/v1/students/{id}/payments"))
        .json(&json!({"amount": 50, "method": "cash", "date": "2024-01-10"}))
        .await
        .json::<Value>();
    let payment_id = payment["id"].as_i64().unwrap();

    let updated = app
        .server
        .put(&format!("/api/v1/payments/{payment_id}"))
        .json(&json!({"amount": "75.50", "method": "card", "date": "2024-03-01", "student_id": 999}))
        .await
        .json::<Value>();
    assert_eq!(amount(&updated["amount"]), Decimal::new(7550, 2));
    assert_eq!(updated["method"], "card");
    assert_eq!(updated["student_id"], id);

    let student = app.server.get(&format!("/api/v1/students/{id}")).await.json::<Value>();
    assert_eq!(student["due_on"], "2024-02-09");

    app.server
        .delete(&format!("/api/v1/payments/{payment_id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/api/v1/payments/{payment_id}"))
        .await
        .assert_status_not_found();

    let student = app.server.get(&format!("/api/v1/students/{id}")).await.json::<Value>();
    assert_eq!(student["due_on"], "2024-02-09");
    assert_eq!(student["payments"], json!([]));
}

#[tokio::test]
async fn test_payment_histories() {
    let app = TestApp::on(date(2024, 1, 10));
    let ana = app.create_student(json!({"name": "Ana"})).await["id"].as_i64().unwrap();
    let bia = app.create_student(json!({"name": "Bia"})).await["id"].as_i64().unwrap();
    for (student, day) in [(ana, "2024-01-09"), (bia, "2024-01-05"), (ana, "2024-01-02")] {
        app.server
            .post("/api/v1/payments")
            .json(&json!({"student_id": student, "amount": 10, "method": "cash", "date": day}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let all = app.server.get("/api/v1/payments").await.json::<Value>();
    assert_eq!(all.as_array().unwrap().len(), 3);

    let history = app
        .server
        .get(&format!("/api/v1/students/{ana}/payments"))
        .await
        .json::<Value>();
    let dates: Vec<_> = history
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2024-01-02", "2024-01-09"]);

    app.server
        .get("/api/v1/students/999/payments")
        .await
        .assert_status_not_found();
}
