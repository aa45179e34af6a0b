// server/src/web/handlers/notification_handlers.rs

use actix_web::{web, HttpResponse};
use spareparts::OutboundMessage;
use tracing::instrument;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::envelope::Envelope;

/// Sends an already rendered message. Fails when messaging is not configured.
#[instrument(name = "handler::send_notification", skip(app_state, payload), fields(kind = %payload.kind))]
pub async fn send_notification_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<OutboundMessage>,
) -> Result<HttpResponse> {
  let services = app_state.services();
  let receipt = services
    .notifier
    .send_message(services.transport.as_ref(), &payload)
    .await?;
  Ok(Envelope::success(receipt).with_message("Message sent").ok())
}
