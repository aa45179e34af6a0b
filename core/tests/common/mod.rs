// core/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use spareparts::error::WorkflowError;
use spareparts::notify::{DeliveryReceipt, MessageTransport, NotificationConfig, NotificationEngine, OutboundMessage};
use spareparts::workflow::{ContextData, Handler, PipelineControl};
use spareparts::{InMemoryStore, LifecycleError, LifecycleFlows, LifecycleServices, NewRequest, PaymentSessionGenerator};
use std::sync::Arc;
use tracing::Level;

// --- Workflow test context ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Workflow error: {0}")]
  Workflow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<WorkflowError> for TestError {
  fn from(err: WorkflowError) -> Self {
    TestError::Workflow(format!("{:?}", err))
  }
}

pub fn create_simple_handler(step_name: &'static str, message_to_append: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    let step_name_owned = step_name.to_string();
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name_owned.clone());
      tracing::debug!(target: "test_handlers", step = %step_name_owned, "executed, counter: {}", guard.counter);
      if guard.should_stop_at.as_deref() == Some(step_name_owned.as_str()) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(step_name: &'static str, error_message: &'static str) -> Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    let step_name_owned = step_name.to_string();
    let error_message_owned = error_message.to_string();
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name_owned);
      Err(TestError::Handler(error_message_owned))
    })
  })
}

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Lifecycle fixtures ---
pub fn sample_request(request_id: &str) -> NewRequest {
  NewRequest {
    request_id: request_id.to_string(),
    customer_name: "Ali Hassan".to_string(),
    phone_number: "+966500000000".to_string(),
    email: "ali@example.com".to_string(),
    vehicle_estamra: "EST-123".to_string(),
    vin_number: "1HGCM82633A004352".to_string(),
    part_name: "Brake Pad".to_string(),
    ..Default::default()
  }
}

pub fn active_notification_config() -> NotificationConfig {
  NotificationConfig {
    phone_number: "+966511111111".to_string(),
    display_name: "Parts Desk".to_string(),
    business_name: "Example Parts Co".to_string(),
    is_active: true,
    ..Default::default()
  }
}

/// Transport that records every message it is handed. It succeeds unless
/// `reject_with` is set, in which case every delivery fails with that reason.
#[derive(Debug, Default)]
pub struct RecordingTransport {
  pub sent: Mutex<Vec<(String, OutboundMessage)>>,
  pub reject_with: Option<String>,
}

impl RecordingTransport {
  pub fn rejecting(reason: &str) -> Self {
    Self {
      reject_with: Some(reason.to_string()),
      ..Default::default()
    }
  }

  pub fn count(&self) -> usize {
    self.sent.lock().len()
  }
}

#[async_trait]
impl MessageTransport for RecordingTransport {
  async fn deliver(&self, from: &str, message: &OutboundMessage) -> spareparts::Result<DeliveryReceipt> {
    let mut sent = self.sent.lock();
    sent.push((from.to_string(), message.clone()));
    if let Some(reason) = &self.reject_with {
      return Err(LifecycleError::Transport(reason.clone()));
    }
    Ok(DeliveryReceipt {
      success: true,
      message_id: Some(format!("rec_{}", sent.len())),
      error: None,
    })
  }
}

pub struct Harness {
  pub store: Arc<InMemoryStore>,
  pub transport: Arc<RecordingTransport>,
  pub flows: LifecycleFlows,
}

/// Flows over an in-memory store. `config` decides whether messages are delivered.
pub fn harness(config: Option<NotificationConfig>) -> Harness {
  harness_with(config, RecordingTransport::default())
}

pub fn harness_with(config: Option<NotificationConfig>, transport: RecordingTransport) -> Harness {
  let store = Arc::new(InMemoryStore::new());
  let transport = Arc::new(transport);
  let services = LifecycleServices {
    store: store.clone(),
    notifier: Arc::new(NotificationEngine::new(config)),
    payments: Arc::new(PaymentSessionGenerator::new("https://pay.example.com")),
    transport: transport.clone(),
  };
  Harness {
    store,
    transport,
    flows: LifecycleFlows::new(services),
  }
}
