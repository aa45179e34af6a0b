// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use spareparts::LifecycleError;
use thiserror::Error;

use crate::web::envelope::Envelope;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("{source}")]
  Lifecycle {
    #[from]
    source: LifecycleError,
  },

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<LifecycleError>() {
      Ok(source) => AppError::Lifecycle { source },
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(other) => AppError::Internal(format!("{:#}", other)),
      },
    }
  }
}

impl AppError {
  /// Short error label and the message the caller is allowed to see.
  ///
  /// Storage and internal failures only ever expose a generic message.
  fn public_parts(&self) -> (&'static str, Option<String>) {
    match self {
      AppError::Validation(m) => ("Validation failed", Some(m.clone())),
      AppError::Auth(m) => ("Authentication failed", Some(m.clone())),
      AppError::NotFound(m) => ("Not found", Some(m.clone())),
      AppError::Config(m) => ("Configuration error", Some(m.clone())),
      AppError::Lifecycle { source } => match source {
        LifecycleError::InvalidInput(m) | LifecycleError::InvalidUpdate(m) => ("Validation failed", Some(m.clone())),
        LifecycleError::MissingField(f) => ("Validation failed", Some(format!("{} is required", f))),
        LifecycleError::DuplicateKey(id) => ("Validation failed", Some(format!("request '{}' already exists", id))),
        LifecycleError::NotFound(m) => ("Not found", Some(m.clone())),
        LifecycleError::NotConfigured(m) => ("Configuration error", Some(m.clone())),
        LifecycleError::Storage { .. } => ("Database operation failed", None),
        LifecycleError::Transport(_) | LifecycleError::Workflow { .. } | LifecycleError::Internal(_) => {
          ("An internal error occurred", None)
        }
      },
      AppError::Sqlx(_) => ("Database operation failed", None),
      AppError::Internal(_) => ("An internal error occurred", None),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Lifecycle { source } if source.is_validation() => StatusCode::BAD_REQUEST,
      AppError::Lifecycle {
        source: LifecycleError::NotFound(_),
      } => StatusCode::NOT_FOUND,
      AppError::Config(_) | AppError::Lifecycle { .. } | AppError::Sqlx(_) | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, %status, "Request rejected");
    }
    let (error, message) = self.public_parts();
    HttpResponse::build(status).json(Envelope::<()>::failure(error, message))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
