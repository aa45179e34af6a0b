// server/src/web/handlers/payment_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::Value;
use spareparts::{pricing, PaymentOrder};
use tracing::instrument;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::envelope::{self, Envelope};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct BreakdownPayload {
  pub parts_cost: Option<Value>,
  pub freight_cost: Option<Value>,
}

#[instrument(name = "handler::cost_breakdown", skip(payload))]
pub async fn breakdown_handler(payload: web::Json<BreakdownPayload>) -> Result<HttpResponse> {
  let breakdown = pricing::breakdown_from_json(payload.parts_cost.as_ref(), payload.freight_cost.as_ref())?;
  Ok(envelope::ok(breakdown))
}

#[instrument(name = "handler::create_payment_session", skip(app_state, payload), fields(order_id = ?payload.order_id))]
pub async fn create_session_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PaymentOrder>,
) -> Result<HttpResponse> {
  let services = app_state.services();
  let session = services.payments.create_session(&payload, &services.notifier)?;
  Ok(Envelope::success(session).with_message("Payment session created").ok())
}
