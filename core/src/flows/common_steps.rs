// core/src/flows/common_steps.rs

//! Steps shared by every flow that ends in a customer notification.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::contexts::NotifyingContext;
use crate::error::{LifecycleError, Result};
use crate::models::RequestUpdate;
use crate::notify::DeliveryReceipt;
use crate::workflow::{ContextData, PipelineControl, SkipCondition};

/// Skips delivery when messaging is not configured; the rendered text is still returned.
pub fn skip_unless_configured<T: NotifyingContext>() -> SkipCondition<T> {
  Arc::new(|ctx: ContextData<T>| !ctx.read().services().notifier.is_configured())
}

pub fn skip_unless_delivered<T: NotifyingContext>() -> SkipCondition<T> {
  Arc::new(|ctx: ContextData<T>| !ctx.read().notification().delivered())
}

/// Loads the request an existing-order flow operates on.
pub async fn load_request_step<T: NotifyingContext>(
  ctx: ContextData<T>,
  request_id: String,
) -> Result<PipelineControl> {
  let store = ctx.read().services().store.clone();
  let request = store
    .get(&request_id)
    .await?
    .ok_or_else(|| LifecycleError::NotFound(format!("request '{}'", request_id)))?;
  ctx.write().set_request(request);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "flow_step::deliver_message", skip(ctx), err(Display))]
pub async fn deliver_message_step<T: NotifyingContext>(ctx: ContextData<T>) -> Result<PipelineControl> {
  let (services, outbound) = {
    let guard = ctx.read();
    (guard.services().clone(), guard.notification().outbound.clone())
  };
  let Some(outbound) = outbound else {
    warn!("No rendered message to deliver.");
    return Ok(PipelineControl::Continue);
  };

  // Transport failures become a failed receipt and the flow continues.
  let receipt = match services
    .notifier
    .send_message(services.transport.as_ref(), &outbound)
    .await
  {
    Ok(receipt) => receipt,
    Err(LifecycleError::Transport(reason)) => {
      warn!(kind = %outbound.kind, %reason, "Customer message was not delivered.");
      DeliveryReceipt {
        success: false,
        message_id: None,
        error: Some(reason),
      }
    }
    Err(e) => return Err(e),
  };
  info!(kind = %outbound.kind, success = receipt.success, "Customer message handed to transport.");
  ctx.write().notification_mut().receipt = Some(receipt);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "flow_step::mark_notification_sent", skip(ctx), err(Display))]
pub async fn mark_notification_sent_step<T: NotifyingContext>(ctx: ContextData<T>) -> Result<PipelineControl> {
  let (store, request_id) = {
    let guard = ctx.read();
    (
      guard.services().store.clone(),
      guard.request().map(|r| r.request_id.clone()),
    )
  };
  let request_id =
    request_id.ok_or_else(|| LifecycleError::Internal("no request in context to mark as notified".to_string()))?;

  let update = RequestUpdate {
    whatsapp_sent: Some(true),
    ..Default::default()
  };
  let updated = store
    .update(&request_id, &update)
    .await?
    .ok_or_else(|| LifecycleError::NotFound(format!("request '{}'", request_id)))?;
  ctx.write().set_request(updated);
  Ok(PipelineControl::Continue)
}
