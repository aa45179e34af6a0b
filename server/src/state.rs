// server/src/state.rs
use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::auth_service::AdminCredentials;
use spareparts::{
  LifecycleFlows, LifecycleServices, MessageTransport, NotificationConfig, NotificationEngine,
  PaymentSessionGenerator, RequestStore, SimulatedTransport,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub flows: Arc<LifecycleFlows>,
  pub admin: Arc<AdminCredentials>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the lifecycle services around `store` using the simulated transport.
  pub fn new(config: Arc<AppConfig>, store: Arc<dyn RequestStore>) -> Result<Self> {
    let transport: Arc<dyn MessageTransport> = Arc::new(SimulatedTransport::new(config.messaging_delay));
    Self::with_transport(config, store, transport)
  }

  pub fn with_transport(
    config: Arc<AppConfig>,
    store: Arc<dyn RequestStore>,
    transport: Arc<dyn MessageTransport>,
  ) -> Result<Self> {
    let notification_config = match &config.notification_config_path {
      Some(path) => NotificationConfig::load(path).map_err(AppError::from)?,
      None => None,
    };
    let services = LifecycleServices {
      store,
      notifier: Arc::new(NotificationEngine::new(notification_config)),
      payments: Arc::new(PaymentSessionGenerator::new(config.payment_base_url.clone())),
      transport,
    };
    let admin = AdminCredentials::from_config(
      &config.admin_username,
      config.admin_password_hash.as_deref(),
      config.admin_password.as_deref(),
    )?;

    Ok(Self {
      flows: Arc::new(LifecycleFlows::new(services)),
      admin: Arc::new(admin),
      config,
    })
  }

  pub fn services(&self) -> &LifecycleServices {
    self.flows.services()
  }

  pub fn store(&self) -> &dyn RequestStore {
    self.services().store.as_ref()
  }
}
