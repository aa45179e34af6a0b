// core/src/notify/engine.rs

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

use super::template::{self, DispatchVars, MessageKind, PaymentVars, TemplateVars, WelcomeVars};
use super::transport::{DeliveryReceipt, MessageTransport, OutboundMessage};
use crate::error::{LifecycleError, Result};

/// Sender identity and message templates for customer notifications.
///
/// A blank or missing template falls back to the built-in default for its kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
  pub phone_number: String,
  pub display_name: String,
  pub business_name: String,
  pub welcome_message: Option<String>,
  pub payment_message_template: Option<String>,
  pub dispatch_message_template: Option<String>,
  pub is_active: bool,
}

impl NotificationConfig {
  /// Reads a JSON config file. A missing file is "no config", not an error.
  pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
    let path = path.as_ref();
    let raw = match std::fs::read_to_string(path) {
      Ok(raw) => raw,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        warn!(path = %path.display(), "Notification config file not found; using default templates.");
        return Ok(None);
      }
      Err(e) => {
        return Err(LifecycleError::NotConfigured(format!(
          "cannot read notification config {}: {}",
          path.display(),
          e
        )))
      }
    };
    let config: NotificationConfig = serde_json::from_str(&raw).map_err(|e| {
      LifecycleError::NotConfigured(format!("invalid notification config {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), active = config.is_active, "Notification config loaded.");
    Ok(Some(config))
  }

  fn template_for(&self, kind: MessageKind) -> Option<&str> {
    let template = match kind {
      MessageKind::Welcome => &self.welcome_message,
      MessageKind::Payment => &self.payment_message_template,
      MessageKind::Dispatch => &self.dispatch_message_template,
    };
    template.as_deref().filter(|t| !t.trim().is_empty())
  }
}

/// Renders and delivers customer messages.
///
/// The configuration is fixed for the engine's lifetime; reloading means
/// building a new engine with [`NotificationEngine::with_config`].
#[derive(Debug, Clone, Default)]
pub struct NotificationEngine {
  config: Option<NotificationConfig>,
}

impl NotificationEngine {
  pub fn new(config: Option<NotificationConfig>) -> Self {
    Self { config }
  }

  pub fn with_config(&self, config: Option<NotificationConfig>) -> Self {
    Self::new(config)
  }

  pub fn config(&self) -> Option<&NotificationConfig> {
    self.config.as_ref()
  }

  fn active_config(&self) -> Option<&NotificationConfig> {
    self.config.as_ref().filter(|c| c.is_active)
  }

  /// Present, active and with a sender number.
  pub fn is_configured(&self) -> bool {
    self
      .active_config()
      .is_some_and(|c| !c.phone_number.trim().is_empty())
  }

  fn render(&self, vars: &dyn TemplateVars) -> String {
    let kind = vars.kind();
    let template = self
      .active_config()
      .and_then(|c| c.template_for(kind))
      .unwrap_or_else(|| kind.default_template());
    template::render(template, vars)
  }

  pub fn render_welcome(&self, vars: &WelcomeVars) -> String {
    self.render(vars)
  }

  pub fn render_payment(&self, vars: &PaymentVars) -> String {
    self.render(vars)
  }

  pub fn render_dispatch(&self, vars: &DispatchVars) -> String {
    self.render(vars)
  }

  /// Hands a rendered message to `transport`, sending from the configured number.
  #[instrument(name = "notify::send_message", skip(self, transport, message), fields(kind = %message.kind))]
  pub async fn send_message(
    &self,
    transport: &dyn MessageTransport,
    message: &OutboundMessage,
  ) -> Result<DeliveryReceipt> {
    let sender = match self.active_config() {
      Some(c) if !c.phone_number.trim().is_empty() => c.phone_number.clone(),
      _ => {
        warn!("Messaging is not configured; refusing to send.");
        return Err(LifecycleError::NotConfigured(
          "messaging is not configured".to_string(),
        ));
      }
    };
    if message.to.trim().is_empty() {
      return Err(LifecycleError::MissingField("to".to_string()));
    }
    if message.message.trim().is_empty() {
      return Err(LifecycleError::MissingField("message".to_string()));
    }
    transport.deliver(&sender, message).await
  }
}
