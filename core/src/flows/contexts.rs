// core/src/flows/contexts.rs

//! Context data carried through each lifecycle pipeline.
//! Handlers receive these wrapped in `ContextData`.

use serde_json::Value;
use std::sync::Arc;

use crate::models::{NewRequest, SparePartRequest};
use crate::notify::{DeliveryReceipt, MessageTransport, NotificationEngine, OutboundMessage};
use crate::payment::{PaymentSession, PaymentSessionGenerator};
use crate::pricing::CostBreakdown;
use crate::store::RequestStore;

/// Collaborators shared by every flow.
#[derive(Clone)]
pub struct LifecycleServices {
  pub store: Arc<dyn RequestStore>,
  pub notifier: Arc<NotificationEngine>,
  pub payments: Arc<PaymentSessionGenerator>,
  pub transport: Arc<dyn MessageTransport>,
}

/// Message produced by a flow and what happened when it was handed to the transport.
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
  pub outbound: Option<OutboundMessage>,
  pub receipt: Option<DeliveryReceipt>,
}

impl NotificationState {
  pub fn delivered(&self) -> bool {
    self.receipt.as_ref().is_some_and(|r| r.success)
  }
}

/// Access used by the notification steps shared between flows.
pub trait NotifyingContext: Send + Sync + 'static {
  fn services(&self) -> &LifecycleServices;
  fn request(&self) -> Option<&SparePartRequest>;
  fn set_request(&mut self, request: SparePartRequest);
  fn notification(&self) -> &NotificationState;
  fn notification_mut(&mut self) -> &mut NotificationState;
}

#[derive(Clone)]
pub struct RegistrationCtxData {
  pub services: LifecycleServices,
  pub new_request: NewRequest,
  pub request: Option<SparePartRequest>,
  pub notification: NotificationState,
}

#[derive(Clone)]
pub struct PaymentLinkCtxData {
  pub services: LifecycleServices,
  pub request_id: String,
  pub parts_cost: Option<Value>,
  pub freight_cost: Option<Value>,
  pub request: Option<SparePartRequest>,
  pub breakdown: Option<CostBreakdown>,
  pub session: Option<PaymentSession>,
  pub notification: NotificationState,
}

#[derive(Clone)]
pub struct DispatchCtxData {
  pub services: LifecycleServices,
  pub request_id: String,
  pub tracking_number: String,
  pub request: Option<SparePartRequest>,
  pub notification: NotificationState,
}

macro_rules! impl_notifying_context {
  ($($ctx:ty),+ $(,)?) => {
    $(
      impl NotifyingContext for $ctx {
        fn services(&self) -> &LifecycleServices {
          &self.services
        }

        fn request(&self) -> Option<&SparePartRequest> {
          self.request.as_ref()
        }

        fn set_request(&mut self, request: SparePartRequest) {
          self.request = Some(request);
        }

        fn notification(&self) -> &NotificationState {
          &self.notification
        }

        fn notification_mut(&mut self) -> &mut NotificationState {
          &mut self.notification
        }
      }
    )+
  };
}

impl_notifying_context!(RegistrationCtxData, PaymentLinkCtxData, DispatchCtxData);
