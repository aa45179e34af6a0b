// server/src/web/handlers/request_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use spareparts::{NewRequest, PaymentLinkInput, RequestFilter, RequestUpdate};
use tracing::{info, instrument};

use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::web::envelope::{self, Envelope};

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct DispatchPayload {
  pub tracking_number: String,
}

fn not_found(request_id: &str) -> AppError {
  AppError::NotFound(format!("request '{}'", request_id))
}

#[instrument(name = "handler::list_requests", skip(app_state))]
pub async fn list_requests_handler(
  app_state: web::Data<AppState>,
  filter: web::Query<RequestFilter>,
) -> Result<HttpResponse> {
  let rows = app_state.store().list(&filter).await?;
  Ok(envelope::ok(rows))
}

#[instrument(name = "handler::get_request", skip(app_state))]
pub async fn get_request_handler(app_state: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse> {
  let request_id = path.into_inner();
  let request = app_state
    .store()
    .get(&request_id)
    .await?
    .ok_or_else(|| not_found(&request_id))?;
  Ok(envelope::ok(request))
}

/// Registration flow: store the request and greet the customer.
#[instrument(name = "handler::create_request", skip(app_state, payload), fields(request_id = %payload.request_id))]
pub async fn create_request_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<NewRequest>,
) -> Result<HttpResponse> {
  let outcome = app_state.flows.register(payload.into_inner()).await?;
  info!(request_id = %outcome.request.request_id, "Request created via API.");
  Ok(Envelope::success(outcome).with_message("Request created").ok())
}

#[instrument(name = "handler::update_request", skip(app_state, payload))]
pub async fn update_request_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<RequestUpdate>,
) -> Result<HttpResponse> {
  let request_id = path.into_inner();
  let updated = app_state
    .store()
    .update(&request_id, &payload)
    .await?
    .ok_or_else(|| not_found(&request_id))?;
  Ok(Envelope::success(updated).with_message("Request updated").ok())
}

#[instrument(name = "handler::issue_payment_link", skip(app_state, payload))]
pub async fn payment_link_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<PaymentLinkInput>,
) -> Result<HttpResponse> {
  let outcome = app_state
    .flows
    .issue_payment_link(&path, payload.into_inner())
    .await?;
  Ok(Envelope::success(outcome).with_message("Payment link created").ok())
}

#[instrument(name = "handler::dispatch_request", skip(app_state, payload))]
pub async fn dispatch_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  payload: web::Json<DispatchPayload>,
) -> Result<HttpResponse> {
  let outcome = app_state.flows.dispatch(&path, &payload.tracking_number).await?;
  Ok(Envelope::success(outcome).with_message("Request dispatched").ok())
}
