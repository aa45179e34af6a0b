// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::errors::{AppError, Result};
use crate::state::AppState;
use crate::web::envelope::Envelope;

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub username: String,
  pub password: String,
}

#[derive(Serialize, Debug)]
pub struct LoginResponse {
  pub token: String,
  pub username: String,
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(username = %payload.username))]
pub async fn login_handler(app_state: web::Data<AppState>, payload: web::Json<LoginPayload>) -> Result<HttpResponse> {
  let LoginPayload { username, password } = payload.into_inner();
  if username.trim().is_empty() || password.is_empty() {
    return Err(AppError::Validation("username and password are required".to_string()));
  }
  let token = app_state.admin.authenticate(&username, &password)?;
  Ok(
    Envelope::success(LoginResponse { token, username })
      .with_message("Login successful")
      .ok(),
  )
}
