// core/src/flows/payment_link.rs

//! Pricing an existing request and sending the customer a payment link.

use tracing::info;

use super::common_steps;
use super::contexts::PaymentLinkCtxData;
use crate::error::LifecycleError;
use crate::models::RequestUpdate;
use crate::notify::{MessageKind, OutboundMessage};
use crate::payment::PaymentOrder;
use crate::pricing;
use crate::workflow::{ContextData, Pipeline, PipelineControl};

pub fn build_payment_link_pipeline() -> Pipeline<PaymentLinkCtxData, LifecycleError> {
  let mut p = Pipeline::<PaymentLinkCtxData, LifecycleError>::new(&[
    ("load_request", false, None),
    ("compute_breakdown", false, None),
    ("create_payment_session", false, None),
    ("persist_payment_details", false, None),
    (
      "deliver_payment_message",
      true,
      Some(common_steps::skip_unless_configured::<PaymentLinkCtxData>()),
    ),
    (
      "mark_notification_sent",
      true,
      Some(common_steps::skip_unless_delivered::<PaymentLinkCtxData>()),
    ),
  ]);

  p.on_root("load_request", |ctx_data: ContextData<PaymentLinkCtxData>| {
    Box::pin(async move {
      let request_id = ctx_data.read().request_id.clone();
      common_steps::load_request_step(ctx_data, request_id).await
    })
  });

  p.on_root("compute_breakdown", |ctx_data: ContextData<PaymentLinkCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let breakdown = pricing::breakdown_from_json(guard.parts_cost.as_ref(), guard.freight_cost.as_ref())?;
      guard.breakdown = Some(breakdown);
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("create_payment_session", |ctx_data: ContextData<PaymentLinkCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let (Some(request), Some(breakdown)) = (guard.request.clone(), guard.breakdown.clone()) else {
        return Err(LifecycleError::Internal(
          "payment session requested before request and breakdown were loaded".to_string(),
        ));
      };
      let order = PaymentOrder::new(
        request.request_id.clone(),
        request.customer_name.clone(),
        request.email.clone(),
        request.part_name.clone(),
        breakdown.parts_cost,
        breakdown.freight_cost,
      )?;
      let session = guard
        .services
        .payments
        .create_session(&order, &guard.services.notifier)?;
      guard.notification.outbound = Some(OutboundMessage {
        to: request.phone_number,
        message: session.message.clone(),
        kind: MessageKind::Payment,
      });
      guard.session = Some(session);
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("persist_payment_details", |ctx_data: ContextData<PaymentLinkCtxData>| {
    Box::pin(async move {
      let (store, request_id, session) = {
        let guard = ctx_data.read();
        (guard.services.store.clone(), guard.request_id.clone(), guard.session.clone())
      };
      let session = session
        .ok_or_else(|| LifecycleError::Internal("no payment session to persist".to_string()))?;

      let update = RequestUpdate {
        price: Some(Some(session.breakdown.total_cost)),
        parts_cost: Some(Some(session.breakdown.parts_cost)),
        freight_cost: Some(Some(session.breakdown.freight_cost)),
        payment_link: Some(Some(session.payment_url.clone())),
        ..Default::default()
      };
      let updated = store
        .update(&request_id, &update)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(format!("request '{}'", request_id)))?;
      info!(%request_id, payment_id = %session.payment_id, "Payment link stored on request.");
      ctx_data.write().request = Some(updated);
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("deliver_payment_message", common_steps::deliver_message_step::<PaymentLinkCtxData>);
  p.on_root("mark_notification_sent", common_steps::mark_notification_sent_step::<PaymentLinkCtxData>);

  p
}
