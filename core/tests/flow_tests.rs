// core/tests/flow_tests.rs
mod common;

use common::*;
use serde_json::json;
use serial_test::serial;
use spareparts::models::{PaymentStatus, RequestStatus, RequestUpdate};
use spareparts::notify::{MessageKind, NotificationEngine};
use spareparts::payment::{PaymentOrder, PaymentSessionGenerator};
use spareparts::store::RequestStore;
use spareparts::{dashboard, LifecycleError, PaymentLinkInput};

fn costs(parts: serde_json::Value, freight: serde_json::Value) -> PaymentLinkInput {
  PaymentLinkInput {
    parts_cost: Some(parts),
    freight_cost: Some(freight),
  }
}

#[tokio::test]
#[serial]
async fn test_registration_without_messaging_still_renders_welcome() {
  setup_tracing();
  let h = harness(None);

  let outcome = h.flows.register(sample_request("REQ-1")).await.unwrap();

  assert_eq!(outcome.request.request_id, "REQ-1");
  assert!(!outcome.request.whatsapp_sent);
  assert!(outcome.delivery.is_none());
  let message = outcome.message.unwrap();
  assert!(message.contains("Ali Hassan"));
  assert!(message.contains("Brake Pad"));
  assert_eq!(h.transport.count(), 0);
}

#[tokio::test]
#[serial]
async fn test_registration_with_messaging_delivers_and_marks_sent() {
  setup_tracing();
  let h = harness(Some(active_notification_config()));

  let outcome = h.flows.register(sample_request("REQ-1")).await.unwrap();

  assert!(outcome.delivery.unwrap().success);
  assert!(outcome.request.whatsapp_sent);
  assert!(h.store.get("REQ-1").await.unwrap().unwrap().whatsapp_sent);

  let sent = h.transport.sent.lock();
  assert_eq!(sent.len(), 1);
  let (from, message) = &sent[0];
  assert_eq!(from, "+966511111111");
  assert_eq!(message.to, "+966500000000");
  assert_eq!(message.kind, MessageKind::Welcome);
}

#[tokio::test]
#[serial]
async fn test_inactive_config_skips_delivery() {
  setup_tracing();
  let mut config = active_notification_config();
  config.is_active = false;
  let h = harness(Some(config));

  let outcome = h.flows.register(sample_request("REQ-1")).await.unwrap();
  assert!(outcome.delivery.is_none());
  assert_eq!(h.transport.count(), 0);
}

#[tokio::test]
#[serial]
async fn test_registration_of_duplicate_id_fails_without_sending() {
  setup_tracing();
  let h = harness(Some(active_notification_config()));
  h.flows.register(sample_request("REQ-1")).await.unwrap();

  let err = h.flows.register(sample_request("REQ-1")).await.unwrap_err();
  assert!(matches!(err, LifecycleError::DuplicateKey(_)));
  assert_eq!(h.transport.count(), 1);
}

#[tokio::test]
#[serial]
async fn test_payment_link_prices_request_and_stores_link() {
  setup_tracing();
  let h = harness(Some(active_notification_config()));
  h.flows.register(sample_request("REQ-1")).await.unwrap();

  let outcome = h
    .flows
    .issue_payment_link("REQ-1", costs(json!(250), json!(50)))
    .await
    .unwrap();

  let session = &outcome.session;
  assert_eq!(session.breakdown.total_cost, 300.0);
  assert_eq!(session.breakdown.currency, "SAR");
  assert_eq!(session.order_id, "REQ-1");
  assert!(session.payment_url.starts_with("https://pay.example.com/pay/PAY-"));

  let stored = h.store.get("REQ-1").await.unwrap().unwrap();
  assert_eq!(stored.price, Some(300.0));
  assert_eq!(stored.parts_cost, Some(250.0));
  assert_eq!(stored.freight_cost, Some(50.0));
  assert_eq!(stored.payment_link.as_deref(), Some(session.payment_url.as_str()));
  assert_eq!(stored.payment_status, PaymentStatus::Pending);

  let message = outcome.outcome.message.unwrap();
  assert!(message.contains("300.00 SAR"));
  let sent = h.transport.sent.lock();
  assert_eq!(sent.last().unwrap().1.kind, MessageKind::Payment);
}

#[tokio::test]
#[serial]
async fn test_payment_link_for_unknown_request_is_not_found() {
  setup_tracing();
  let h = harness(None);
  let err = h
    .flows
    .issue_payment_link("REQ-404", costs(json!(1), json!(1)))
    .await
    .unwrap_err();
  assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_payment_link_rejects_non_numeric_cost_before_writing() {
  setup_tracing();
  let h = harness(None);
  h.flows.register(sample_request("REQ-1")).await.unwrap();

  let err = h
    .flows
    .issue_payment_link("REQ-1", costs(json!("abc"), json!(10)))
    .await
    .unwrap_err();
  assert!(matches!(err, LifecycleError::InvalidInput(_)));
  let stored = h.store.get("REQ-1").await.unwrap().unwrap();
  assert_eq!(stored.payment_link, None);
  assert_eq!(stored.price, None);
}

#[tokio::test]
#[serial]
async fn test_dispatch_marks_request_and_sends_tracking_number() {
  setup_tracing();
  let h = harness(Some(active_notification_config()));
  h.flows.register(sample_request("REQ-1")).await.unwrap();

  let outcome = h.flows.dispatch("REQ-1", "TRK-778899").await.unwrap();

  assert_eq!(outcome.request.status, RequestStatus::Dispatched);
  let message = outcome.message.unwrap();
  assert!(message.contains("TRK-778899"));
  assert!(message.contains("REQ-1"));
  assert_eq!(h.store.stats().await.unwrap().dispatched_requests, 1);
}

#[tokio::test]
#[serial]
async fn test_failed_welcome_delivery_keeps_registration() {
  setup_tracing();
  let h = harness_with(
    Some(active_notification_config()),
    RecordingTransport::rejecting("gateway unreachable"),
  );

  let outcome = h.flows.register(sample_request("REQ-1")).await.unwrap();

  let receipt = outcome.delivery.unwrap();
  assert!(!receipt.success);
  assert_eq!(receipt.error.as_deref(), Some("gateway unreachable"));
  assert!(!outcome.request.whatsapp_sent);
  assert_eq!(h.transport.count(), 1);

  let stored = h.store.get("REQ-1").await.unwrap().unwrap();
  assert!(!stored.whatsapp_sent);
  assert_eq!(stored, outcome.request);
}

#[tokio::test]
#[serial]
async fn test_failed_dispatch_delivery_keeps_status_change() {
  setup_tracing();
  let h = harness_with(
    Some(active_notification_config()),
    RecordingTransport::rejecting("gateway unreachable"),
  );
  h.flows.register(sample_request("REQ-1")).await.unwrap();

  let outcome = h.flows.dispatch("REQ-1", "TRK-1").await.unwrap();

  assert!(!outcome.delivery.unwrap().success);
  let stored = h.store.get("REQ-1").await.unwrap().unwrap();
  assert_eq!(stored.status, RequestStatus::Dispatched);
  assert!(!stored.whatsapp_sent);
}

#[tokio::test]
#[serial]
async fn test_dispatch_requires_tracking_number() {
  setup_tracing();
  let h = harness(None);
  h.flows.register(sample_request("REQ-1")).await.unwrap();

  let err = h.flows.dispatch("REQ-1", " ").await.unwrap_err();
  assert!(matches!(err, LifecycleError::MissingField(ref f) if f == "tracking_number"));
  assert_eq!(
    h.store.get("REQ-1").await.unwrap().unwrap().status,
    RequestStatus::Pending
  );
}

#[tokio::test]
#[serial]
async fn test_dispatch_unknown_request_is_not_found() {
  setup_tracing();
  let h = harness(None);
  let err = h.flows.dispatch("REQ-404", "TRK-1").await.unwrap_err();
  assert!(matches!(err, LifecycleError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_payment_round_trip_updates_dashboard() {
  setup_tracing();
  let h = harness(None);

  let mut new = sample_request("REQ-E2E");
  new.parts_cost = Some(100.0);
  new.freight_cost = Some(20.0);
  h.store.create(&new).await.unwrap();
  let before = dashboard::summarize(h.store.as_ref()).await.unwrap();

  let generator = PaymentSessionGenerator::new("https://pay.example.com");
  let order = PaymentOrder::new("REQ-E2E", "Ali Hassan", "ali@example.com", "Brake Pad", 100.0, 20.0).unwrap();
  let session = generator.create_session(&order, &NotificationEngine::default()).unwrap();

  assert_eq!(session.breakdown.total_cost, 120.0);
  assert!(session.message.contains("120.00 SAR"));
  assert!(session.message.contains(&session.payment_url));
  assert_eq!(session.expires_at - session.created_at, chrono::Duration::hours(24));

  let paid = h
    .store
    .update(
      "REQ-E2E",
      &RequestUpdate {
        payment_status: Some(PaymentStatus::Paid),
        payment_link: Some(Some(session.payment_url.clone())),
        ..Default::default()
      },
    )
    .await
    .unwrap()
    .unwrap();
  assert_eq!(paid.payment_status, PaymentStatus::Paid);

  let after = dashboard::summarize(h.store.as_ref()).await.unwrap();
  assert_eq!(after.stats.pending_payments, before.stats.pending_payments - 1);
  assert_eq!(after.stats.total_parts_cost, 100.0);
  assert_eq!(after.stats.total_freight_cost, 20.0);
  assert_eq!(after.status_distribution.get("pending"), Some(&1));
}
