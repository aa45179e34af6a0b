// core/src/flows/registration.rs

//! New request intake: persist, greet the customer, record the greeting.

use tracing::info;

use super::common_steps;
use super::contexts::RegistrationCtxData;
use crate::error::LifecycleError;
use crate::notify::{MessageKind, OutboundMessage, WelcomeVars};
use crate::workflow::{ContextData, Pipeline, PipelineControl};

pub fn build_registration_pipeline() -> Pipeline<RegistrationCtxData, LifecycleError> {
  let mut p = Pipeline::<RegistrationCtxData, LifecycleError>::new(&[
    ("create_request_record", false, None),
    ("render_welcome_message", false, None),
    (
      "deliver_welcome_message",
      true,
      Some(common_steps::skip_unless_configured::<RegistrationCtxData>()),
    ),
    (
      "mark_notification_sent",
      true,
      Some(common_steps::skip_unless_delivered::<RegistrationCtxData>()),
    ),
  ]);

  p.on_root("create_request_record", |ctx_data: ContextData<RegistrationCtxData>| {
    Box::pin(async move {
      let (store, new_request) = {
        let guard = ctx_data.read();
        (guard.services.store.clone(), guard.new_request.clone())
      };
      let created = store.create(&new_request).await?;
      info!(request_id = %created.request_id, "Spare part request registered.");
      ctx_data.write().request = Some(created);
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("render_welcome_message", |ctx_data: ContextData<RegistrationCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let request = guard
        .request
        .clone()
        .ok_or_else(|| LifecycleError::Internal("request record missing before welcome render".to_string()))?;
      let message = guard.services.notifier.render_welcome(&WelcomeVars {
        customer_name: request.customer_name.clone(),
        part_name: request.part_name.clone(),
      });
      guard.notification.outbound = Some(OutboundMessage {
        to: request.phone_number,
        message,
        kind: MessageKind::Welcome,
      });
      Ok::<_, LifecycleError>(PipelineControl::Continue)
    })
  });

  p.on_root("deliver_welcome_message", common_steps::deliver_message_step::<RegistrationCtxData>);
  p.on_root("mark_notification_sent", common_steps::mark_notification_sent_step::<RegistrationCtxData>);

  p
}
