// core/src/notify/transport.rs

//! The messaging seam. Real delivery lives outside this crate; the simulated
//! transport stands in for it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use super::template::MessageKind;
use crate::error::Result;

pub const DEFAULT_SIMULATED_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
  pub to: String,
  pub message: String,
  #[serde(rename = "type")]
  pub kind: MessageKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message_id: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// Implementations report delivery failures as [`crate::LifecycleError::Transport`].
#[async_trait]
pub trait MessageTransport: Send + Sync {
  async fn deliver(&self, from: &str, message: &OutboundMessage) -> Result<DeliveryReceipt>;
}

/// Pretends to deliver: waits a fixed delay and always succeeds.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
  delay: Duration,
}

impl SimulatedTransport {
  pub fn new(delay: Duration) -> Self {
    Self { delay }
  }
}

impl Default for SimulatedTransport {
  fn default() -> Self {
    Self::new(DEFAULT_SIMULATED_DELAY)
  }
}

#[async_trait]
impl MessageTransport for SimulatedTransport {
  #[instrument(name = "simulated_transport::deliver", skip(self, message), fields(to = %message.to, kind = %message.kind))]
  async fn deliver(&self, from: &str, message: &OutboundMessage) -> Result<DeliveryReceipt> {
    info!("Simulating message delivery from {}", from);
    tokio::time::sleep(self.delay).await;

    let message_id = format!("sim_msg_{}", Uuid::new_v4().simple());
    info!(%message_id, "Simulated message delivered.");
    Ok(DeliveryReceipt {
      success: true,
      message_id: Some(message_id),
      error: None,
    })
  }
}
