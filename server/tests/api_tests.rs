// server/tests/api_tests.rs

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use spareparts::{InMemoryStore, RequestStore};
use spareparts_server::config::AppConfig;
use spareparts_server::state::AppState;
use spareparts_server::web::{configure_app_routes, routes::not_found_handler};
use std::sync::Arc;
use std::time::Duration;

fn test_config() -> AppConfig {
  AppConfig {
    server_host: "127.0.0.1".to_string(),
    server_port: 0,
    database_url: "postgres://unused".to_string(),
    payment_base_url: "https://pay.example.com".to_string(),
    notification_config_path: None,
    messaging_delay: Duration::ZERO,
    admin_username: "admin".to_string(),
    admin_password_hash: None,
    admin_password: Some("s3cret".to_string()),
    apply_schema: false,
  }
}

fn test_state() -> AppState {
  let store: Arc<dyn RequestStore> = Arc::new(InMemoryStore::new());
  AppState::new(Arc::new(test_config()), store).unwrap()
}

macro_rules! test_app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state))
        .configure(configure_app_routes)
        .default_service(web::to(not_found_handler)),
    )
    .await
  };
}

fn new_request_body(request_id: &str) -> Value {
  json!({
    "request_id": request_id,
    "customer_name": "Ali Hassan",
    "phone_number": "+966500000000",
    "email": "ali@example.com",
    "vehicle_estamra": "EST-1",
    "vin_number": "VIN-123",
    "part_name": "Brake Pad"
  })
}

#[actix_rt::test]
async fn health_reports_ok() {
  let app = test_app!(test_state());
  let resp: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/health").to_request()).await;
  assert_eq!(resp["success"], true);
  assert_eq!(resp["data"]["status"], "ok");
}

#[actix_rt::test]
async fn unknown_route_returns_404_envelope() {
  let app = test_app!(test_state());
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/nope").to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert!(body["error"].is_string());
}

#[actix_rt::test]
async fn create_then_get_and_list() {
  let app = test_app!(test_state());

  let req = test::TestRequest::post()
    .uri("/api/requests")
    .set_json(new_request_body("REQ-1"))
    .to_request();
  let created: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(created["success"], true);
  assert_eq!(created["data"]["request"]["status"], "Pending");
  assert_eq!(created["data"]["request"]["payment_status"], "Pending");
  assert!(created["data"]["message"].as_str().unwrap().contains("Brake Pad"));

  let fetched: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/requests/REQ-1").to_request()).await;
  assert_eq!(fetched["data"]["customer_name"], "Ali Hassan");

  let listed: Value = test::call_and_read_body_json(
    &app,
    test::TestRequest::get().uri("/api/requests?search=brake&status=all").to_request(),
  )
  .await;
  assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn duplicate_create_is_rejected_with_400() {
  let app = test_app!(test_state());
  for expected in [StatusCode::OK, StatusCode::BAD_REQUEST] {
    let req = test::TestRequest::post()
      .uri("/api/requests")
      .set_json(new_request_body("REQ-1"))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), expected);
  }
}

#[actix_rt::test]
async fn missing_required_field_is_400() {
  let app = test_app!(test_state());
  let mut body = new_request_body("REQ-1");
  body["email"] = json!("");
  let resp = test::call_service(&app, test::TestRequest::post().uri("/api/requests").set_json(body).to_request()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["message"], "email is required");
}

#[actix_rt::test]
async fn get_unknown_request_is_404() {
  let app = test_app!(test_state());
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/requests/REQ-X").to_request()).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn patch_semantics() {
  let app = test_app!(test_state());
  let req = test::TestRequest::post()
    .uri("/api/requests")
    .set_json(new_request_body("REQ-1"))
    .to_request();
  test::call_service(&app, req).await;

  let empty = test::TestRequest::patch().uri("/api/requests/REQ-1").set_json(json!({})).to_request();
  assert_eq!(test::call_service(&app, empty).await.status(), StatusCode::BAD_REQUEST);

  let id_change = test::TestRequest::patch()
    .uri("/api/requests/REQ-1")
    .set_json(json!({ "request_id": "REQ-2" }))
    .to_request();
  assert_eq!(test::call_service(&app, id_change).await.status(), StatusCode::BAD_REQUEST);

  let unknown = test::TestRequest::patch()
    .uri("/api/requests/REQ-404")
    .set_json(json!({ "status": "Processing" }))
    .to_request();
  assert_eq!(test::call_service(&app, unknown).await.status(), StatusCode::NOT_FOUND);

  let ok = test::TestRequest::patch()
    .uri("/api/requests/REQ-1")
    .set_json(json!({ "status": "Processing", "price": 42.5 }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, ok).await;
  assert_eq!(body["data"]["status"], "Processing");
  assert_eq!(body["data"]["price"], 42.5);
  assert_eq!(body["data"]["customer_name"], "Ali Hassan");
}

#[actix_rt::test]
async fn negative_pagination_is_400() {
  let app = test_app!(test_state());
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/requests?limit=-1").to_request()).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn breakdown_endpoint() {
  let app = test_app!(test_state());
  let ok = test::TestRequest::post()
    .uri("/api/payments/breakdown")
    .set_json(json!({ "parts_cost": 250, "freight_cost": 50 }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, ok).await;
  assert_eq!(body["data"]["total_cost"], 300.0);
  assert_eq!(body["data"]["currency"], "SAR");

  let bad = test::TestRequest::post()
    .uri("/api/payments/breakdown")
    .set_json(json!({ "parts_cost": "250", "freight_cost": 50 }))
    .to_request();
  assert_eq!(test::call_service(&app, bad).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn payment_session_requires_customer_email() {
  let app = test_app!(test_state());
  let req = test::TestRequest::post()
    .uri("/api/payments/session")
    .set_json(json!({
      "order_id": "REQ-1",
      "customer_name": "Ali",
      "parts_cost": 100,
      "freight_cost": 20
    }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["message"], "customer_email is required");
}

#[actix_rt::test]
async fn payment_session_renders_message() {
  let app = test_app!(test_state());
  let req = test::TestRequest::post()
    .uri("/api/payments/session")
    .set_json(json!({
      "order_id": "REQ-1",
      "customer_name": "Ali",
      "customer_email": "ali@example.com",
      "part_name": "Filter",
      "parts_cost": 100,
      "freight_cost": 20
    }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  let url = body["data"]["payment_url"].as_str().unwrap();
  assert!(url.starts_with("https://pay.example.com/pay/PAY-"));
  let message = body["data"]["message"].as_str().unwrap();
  assert!(message.contains("120.00 SAR"));
  assert!(message.contains(url));
}

#[actix_rt::test]
async fn send_notification_without_config_fails() {
  let app = test_app!(test_state());
  let req = test::TestRequest::post()
    .uri("/api/notifications/send")
    .set_json(json!({ "to": "+966500000000", "message": "hi", "type": "welcome" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "Configuration error");
}

#[actix_rt::test]
async fn payment_link_then_paid_updates_dashboard() {
  let app = test_app!(test_state());
  let req = test::TestRequest::post()
    .uri("/api/requests")
    .set_json(new_request_body("REQ-1"))
    .to_request();
  test::call_service(&app, req).await;

  let before: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/dashboard").to_request()).await;
  assert_eq!(before["data"]["pending_payments"], 1);
  assert_eq!(before["data"]["status_distribution"]["pending"], 1);

  let link = test::TestRequest::post()
    .uri("/api/requests/REQ-1/payment-link")
    .set_json(json!({ "parts_cost": 100, "freight_cost": 20 }))
    .to_request();
  let linked: Value = test::call_and_read_body_json(&app, link).await;
  assert_eq!(linked["data"]["request"]["price"], 120.0);
  assert!(linked["data"]["message"].as_str().unwrap().contains("120.00 SAR"));

  let paid = test::TestRequest::patch()
    .uri("/api/requests/REQ-1")
    .set_json(json!({ "payment_status": "Paid" }))
    .to_request();
  test::call_service(&app, paid).await;

  let after: Value =
    test::call_and_read_body_json(&app, test::TestRequest::get().uri("/api/dashboard").to_request()).await;
  assert_eq!(after["data"]["pending_payments"], 0);
  assert_eq!(after["data"]["total_price"], 120.0);
}

#[actix_rt::test]
async fn dispatch_requires_tracking_number() {
  let app = test_app!(test_state());
  let req = test::TestRequest::post()
    .uri("/api/requests")
    .set_json(new_request_body("REQ-1"))
    .to_request();
  test::call_service(&app, req).await;

  let bad = test::TestRequest::post()
    .uri("/api/requests/REQ-1/dispatch")
    .set_json(json!({}))
    .to_request();
  assert_eq!(test::call_service(&app, bad).await.status(), StatusCode::BAD_REQUEST);

  let ok = test::TestRequest::post()
    .uri("/api/requests/REQ-1/dispatch")
    .set_json(json!({ "tracking_number": "TRK-1" }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, ok).await;
  assert_eq!(body["data"]["request"]["status"], "Dispatched");
}

#[actix_rt::test]
async fn login_accepts_configured_operator_only() {
  let app = test_app!(test_state());
  let good = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({ "username": "admin", "password": "s3cret" }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, good).await;
  assert!(body["data"]["token"].as_str().unwrap().starts_with("session_"));

  let bad = test::TestRequest::post()
    .uri("/api/auth/login")
    .set_json(json!({ "username": "admin", "password": "wrong" }))
    .to_request();
  assert_eq!(test::call_service(&app, bad).await.status(), StatusCode::UNAUTHORIZED);
}
