// core/src/flows/mod.rs

//! The request lifecycle as workflow pipelines: registration, payment link and
//! dispatch. Each step is individually durable; a failure midway leaves the
//! earlier steps' writes in place.

use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::{LifecycleError, Result};
use crate::models::{NewRequest, SparePartRequest};
use crate::notify::DeliveryReceipt;
use crate::payment::PaymentSession;
use crate::workflow::{ContextData, Pipeline, PipelineResult};

pub mod common_steps;
pub mod contexts;
pub mod dispatch;
pub mod payment_link;
pub mod registration;

pub use contexts::{
  DispatchCtxData, LifecycleServices, NotificationState, NotifyingContext, PaymentLinkCtxData,
  RegistrationCtxData,
};

/// What a flow did: the final record, the message it produced and, when
/// messaging is configured, the delivery receipt.
#[derive(Debug, Clone, Serialize)]
pub struct FlowOutcome {
  pub request: SparePartRequest,
  pub message: Option<String>,
  pub delivery: Option<DeliveryReceipt>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentLinkOutcome {
  #[serde(flatten)]
  pub outcome: FlowOutcome,
  pub session: PaymentSession,
}

/// Input for issuing a payment link. Amounts are loosely typed JSON so the
/// breakdown step can reject non-numeric values.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct PaymentLinkInput {
  pub parts_cost: Option<Value>,
  pub freight_cost: Option<Value>,
}

pub struct LifecycleFlows {
  services: LifecycleServices,
  registration: Pipeline<RegistrationCtxData, LifecycleError>,
  payment_link: Pipeline<PaymentLinkCtxData, LifecycleError>,
  dispatch: Pipeline<DispatchCtxData, LifecycleError>,
}

fn ensure_completed(result: PipelineResult, flow: &str) -> Result<()> {
  match result {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => Err(LifecycleError::Internal(format!("{} flow stopped before completing", flow))),
  }
}

fn into_outcome<T: NotifyingContext + Clone>(ctx: ContextData<T>, flow: &str) -> Result<FlowOutcome> {
  let data = ctx.read().clone();
  let request = data
    .request()
    .cloned()
    .ok_or_else(|| LifecycleError::Internal(format!("{} flow finished without a request record", flow)))?;
  let notification = data.notification();
  Ok(FlowOutcome {
    request,
    message: notification.outbound.as_ref().map(|m| m.message.clone()),
    delivery: notification.receipt.clone(),
  })
}

impl LifecycleFlows {
  pub fn new(services: LifecycleServices) -> Self {
    info!("Building lifecycle pipelines.");
    Self {
      services,
      registration: registration::build_registration_pipeline(),
      payment_link: payment_link::build_payment_link_pipeline(),
      dispatch: dispatch::build_dispatch_pipeline(),
    }
  }

  pub fn services(&self) -> &LifecycleServices {
    &self.services
  }

  /// Creates the request and sends the welcome message.
  #[instrument(name = "flows::register", skip(self, new_request), fields(request_id = %new_request.request_id), err(Display))]
  pub async fn register(&self, new_request: NewRequest) -> Result<FlowOutcome> {
    let ctx = ContextData::new(RegistrationCtxData {
      services: self.services.clone(),
      new_request,
      request: None,
      notification: NotificationState::default(),
    });
    ensure_completed(self.registration.run(ctx.clone()).await?, "registration")?;
    into_outcome(ctx, "registration")
  }

  /// Prices the request, stores the payment link on it and sends the payment message.
  #[instrument(name = "flows::issue_payment_link", skip(self, input), err(Display))]
  pub async fn issue_payment_link(&self, request_id: &str, input: PaymentLinkInput) -> Result<PaymentLinkOutcome> {
    let ctx = ContextData::new(PaymentLinkCtxData {
      services: self.services.clone(),
      request_id: request_id.to_string(),
      parts_cost: input.parts_cost,
      freight_cost: input.freight_cost,
      request: None,
      breakdown: None,
      session: None,
      notification: NotificationState::default(),
    });
    ensure_completed(self.payment_link.run(ctx.clone()).await?, "payment link")?;
    let session = ctx
      .read()
      .session
      .clone()
      .ok_or_else(|| LifecycleError::Internal("payment link flow finished without a session".to_string()))?;
    Ok(PaymentLinkOutcome {
      outcome: into_outcome(ctx, "payment link")?,
      session,
    })
  }

  /// Marks the request dispatched and sends the tracking number.
  #[instrument(name = "flows::dispatch", skip(self), err(Display))]
  pub async fn dispatch(&self, request_id: &str, tracking_number: &str) -> Result<FlowOutcome> {
    if tracking_number.trim().is_empty() {
      return Err(LifecycleError::MissingField("tracking_number".to_string()));
    }
    let ctx = ContextData::new(DispatchCtxData {
      services: self.services.clone(),
      request_id: request_id.to_string(),
      tracking_number: tracking_number.to_string(),
      request: None,
      notification: NotificationState::default(),
    });
    ensure_completed(self.dispatch.run(ctx.clone()).await?, "dispatch")?;
    into_outcome(ctx, "dispatch")
  }
}
