// core/src/error.rs
use thiserror::Error;

/// Failures raised by the workflow engine itself, as opposed to the handlers it runs.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },
}

/// Error type shared by every lifecycle operation (store, pricing, payment, notification, flows).
#[derive(Debug, Error)]
pub enum LifecycleError {
  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Missing required field: {0}")]
  MissingField(String),

  #[error("Invalid update: {0}")]
  InvalidUpdate(String),

  #[error("Duplicate key: request '{0}' already exists")]
  DuplicateKey(String),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Not configured: {0}")]
  NotConfigured(String),

  #[error("Storage error: {source}")]
  Storage {
    #[from]
    source: sqlx::Error,
  },

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: WorkflowError,
  },

  #[error("Internal error: {0}")]
  Internal(String),
}

impl LifecycleError {
  /// True for errors the caller can fix by changing its input.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      LifecycleError::InvalidInput(_)
        | LifecycleError::MissingField(_)
        | LifecycleError::InvalidUpdate(_)
        | LifecycleError::DuplicateKey(_)
    )
  }
}

pub type Result<T, E = LifecycleError> = std::result::Result<T, E>;
