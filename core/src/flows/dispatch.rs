// core/src/flows/dispatch.rs

//! Marking a request as dispatched and telling the customer its tracking number.

use tracing::info;

use super::common_steps;
use super::contexts::DispatchCtxData;
use crate::error::LifecycleError;
use crate::models::{RequestStatus, RequestUpdate};
use crate::notify::{DispatchVars, MessageKind, OutboundMessage};
use crate::workflow::{ContextData, Pipeline, PipelineControl};

pub fn build_dispatch_pipeline() -> Pipeline<DispatchCtxData, LifecycleError> {
  let mut p = Pipeline::<DispatchCtxData, LifecycleError>::new(&[
    ("load_request", false, None),
    ("mark_dispatched", false, None),
    ("render_dispatch_message", false, None),
    (
      "deliver_dispatch_message",
      true,
      Some(common_steps::skip_unless_configured::<DispatchCtxData>()),
    ),
    (
      "mark_notification_sent",
      true,
      Some(common_steps::skip_unless_delivered::<DispatchCtxData>()),
    ),
  ]);

  p.on_root("load_request", |ctx_data: ContextData<DispatchCtxData>| {
    Box::pin(async move {
      let request_id = ctx_data.read().request_id.clone();
      common_steps::load_request_step(ctx_data, request_id).await
    })
  });

  p.on_root("mark_dispatched", |ctx_data: ContextData<DispatchCtxData>| {
    Box::pin(async move {
      let (store, request_id) = {
        let guard = ctx_data.read();
        (guard.services.store.clone(), guard.request_id.clone())
      };
      let update = RequestUpdate {
        status: Some(RequestStatus::Dispatched),
        ..Default::default()
      };
      let updated = store
        .update(&request_id, &update)
        .await?
        .ok_or_else(|| LifecycleError::NotFound(format!("request '{}'", request_id)))?;
      info!(%request_id, "Request marked as dispatched.");
      ctx_data.write().request = Some(updated);
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("render_dispatch_message", |ctx_data: ContextData<DispatchCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let request = guard
        .request
        .clone()
        .ok_or_else(|| LifecycleError::Internal("request record missing before dispatch render".to_string()))?;
      let message = guard.services.notifier.render_dispatch(&DispatchVars {
        customer_name: request.customer_name.clone(),
        part_name: request.part_name.clone(),
        tracking_number: guard.tracking_number.clone(),
        order_id: request.request_id.clone(),
      });
      guard.notification.outbound = Some(OutboundMessage {
        to: request.phone_number,
        message,
        kind: MessageKind::Dispatch,
      });
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("deliver_dispatch_message", common_steps::deliver_message_step::<DispatchCtxData>);
  p.on_root("mark_notification_sent", common_steps::mark_notification_sent_step::<DispatchCtxData>);

  p
}
