// core/src/models/status.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LifecycleError;

/// Fulfillment stage of a request.
///
/// The set is open: values written by other tools (e.g. "On Hold") are kept
/// verbatim in `Other` rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestStatus {
  #[default]
  Pending,
  Processing,
  Dispatched,
  Cancelled,
  Other(String),
}

impl RequestStatus {
  pub fn as_str(&self) -> &str {
    match self {
      RequestStatus::Pending => "Pending",
      RequestStatus::Processing => "Processing",
      RequestStatus::Dispatched => "Dispatched",
      RequestStatus::Cancelled => "Cancelled",
      RequestStatus::Other(s) => s,
    }
  }
}

impl From<String> for RequestStatus {
  fn from(value: String) -> Self {
    match value.as_str() {
      "Pending" => RequestStatus::Pending,
      "Processing" => RequestStatus::Processing,
      "Dispatched" => RequestStatus::Dispatched,
      "Cancelled" => RequestStatus::Cancelled,
      _ => RequestStatus::Other(value),
    }
  }
}

impl From<&str> for RequestStatus {
  fn from(value: &str) -> Self {
    RequestStatus::from(value.to_string())
  }
}

impl From<RequestStatus> for String {
  fn from(status: RequestStatus) -> Self {
    match status {
      RequestStatus::Other(s) => s,
      known => known.as_str().to_string(),
    }
  }
}

impl fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Billing stage of a request. Independent of [`RequestStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Failed,
  Expired,
}

impl PaymentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "Pending",
      PaymentStatus::Paid => "Paid",
      PaymentStatus::Failed => "Failed",
      PaymentStatus::Expired => "Expired",
    }
  }
}

impl FromStr for PaymentStatus {
  type Err = LifecycleError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Pending" => Ok(PaymentStatus::Pending),
      "Paid" => Ok(PaymentStatus::Paid),
      "Failed" => Ok(PaymentStatus::Failed),
      "Expired" => Ok(PaymentStatus::Expired),
      other => Err(LifecycleError::InvalidInput(format!("unknown payment status '{}'", other))),
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Dashboard key for a status label: lowercase, spaces replaced by underscores.
pub fn normalize_status_label(label: &str) -> String {
  label.to_lowercase().replace(' ', "_")
}
