// server/src/web/envelope.rs

//! The `{success, data?, error?, message?}` body every endpoint answers with.

use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub data: Option<T>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl<T: Serialize> Envelope<T> {
  pub fn success(data: T) -> Self {
    Self {
      success: true,
      data: Some(data),
      error: None,
      message: None,
    }
  }

  pub fn with_message(mut self, message: impl Into<String>) -> Self {
    self.message = Some(message.into());
    self
  }

  pub fn failure(error: impl Into<String>, message: Option<String>) -> Self {
    Self {
      success: false,
      data: None,
      error: Some(error.into()),
      message,
    }
  }

  /// 200 with this envelope as the body.
  pub fn ok(self) -> HttpResponse {
    HttpResponse::Ok().json(self)
  }
}

/// 200 response wrapping `data`.
pub fn ok<T: Serialize>(data: T) -> HttpResponse {
  Envelope::success(data).ok()
}
