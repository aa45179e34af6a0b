// server/src/web/handlers/dashboard_handlers.rs

use actix_web::{web, HttpResponse};
use spareparts::dashboard;
use tracing::instrument;

use crate::errors::Result;
use crate::state::AppState;
use crate::web::envelope;

#[instrument(name = "handler::dashboard", skip(app_state))]
pub async fn dashboard_handler(app_state: web::Data<AppState>) -> Result<HttpResponse> {
  let summary = dashboard::summarize(app_state.store()).await?;
  Ok(envelope::ok(summary))
}
