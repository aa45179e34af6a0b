// core/src/models/request.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::status::{PaymentStatus, RequestStatus};
use crate::error::{LifecycleError, Result};

/// One spare-part fulfillment order, as persisted in `spare_part_requests`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePartRequest {
  pub request_id: String,
  pub customer_name: String,
  pub phone_number: String,
  pub email: String,
  /// Vehicle registration identifier.
  pub vehicle_estamra: String,
  pub vin_number: String,
  pub part_name: String,
  pub status: RequestStatus,
  pub payment_status: PaymentStatus,
  pub price: Option<f64>,
  pub parts_cost: Option<f64>,
  pub freight_cost: Option<f64>,
  pub payment_link: Option<String>,
  pub whatsapp_sent: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Payload for `RequestStore::create`.
///
/// Identity and customer fields are required; lifecycle and money fields
/// fall back to the creation defaults when omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewRequest {
  pub request_id: String,
  pub customer_name: String,
  pub phone_number: String,
  pub email: String,
  pub vehicle_estamra: String,
  pub vin_number: String,
  pub part_name: String,
  pub status: Option<RequestStatus>,
  pub payment_status: Option<PaymentStatus>,
  pub price: Option<f64>,
  pub parts_cost: Option<f64>,
  pub freight_cost: Option<f64>,
  pub payment_link: Option<String>,
}

impl NewRequest {
  /// Fails with `MissingField` naming the first blank required field.
  pub fn validate(&self) -> Result<()> {
    let required = [
      ("request_id", &self.request_id),
      ("customer_name", &self.customer_name),
      ("phone_number", &self.phone_number),
      ("email", &self.email),
      ("vehicle_estamra", &self.vehicle_estamra),
      ("vin_number", &self.vin_number),
      ("part_name", &self.part_name),
    ];
    if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
      return Err(LifecycleError::MissingField((*name).to_string()));
    }
    for (name, amount) in [
      ("price", self.price),
      ("parts_cost", self.parts_cost),
      ("freight_cost", self.freight_cost),
    ] {
      check_amount(name, amount)?;
    }
    Ok(())
  }
}

/// Partial update for `RequestStore::update`.
///
/// `request_id` and `created_at` are not updatable and unknown fields are
/// rejected at deserialization. Nullable
/// columns use `Option<Option<_>>`: outer `None` leaves the column alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestUpdate {
  pub customer_name: Option<String>,
  pub phone_number: Option<String>,
  pub email: Option<String>,
  pub vehicle_estamra: Option<String>,
  pub vin_number: Option<String>,
  pub part_name: Option<String>,
  pub status: Option<RequestStatus>,
  pub payment_status: Option<PaymentStatus>,
  #[serde(deserialize_with = "present")]
  pub price: Option<Option<f64>>,
  #[serde(deserialize_with = "present")]
  pub parts_cost: Option<Option<f64>>,
  #[serde(deserialize_with = "present")]
  pub freight_cost: Option<Option<f64>>,
  #[serde(deserialize_with = "present")]
  pub payment_link: Option<Option<String>>,
  pub whatsapp_sent: Option<bool>,
}

/// Distinguishes an explicit `null` from an absent key.
fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

fn check_amount(name: &str, amount: Option<f64>) -> Result<()> {
  match amount {
    Some(v) if !v.is_finite() || v < 0.0 => Err(LifecycleError::InvalidInput(format!(
      "{} must be a non-negative number",
      name
    ))),
    _ => Ok(()),
  }
}

impl RequestUpdate {
  pub fn is_empty(&self) -> bool {
    *self == RequestUpdate::default()
  }

  /// Rejects an empty field set and malformed amounts.
  pub fn validate(&self) -> Result<()> {
    if self.is_empty() {
      return Err(LifecycleError::InvalidUpdate(
        "at least one field must be provided".to_string(),
      ));
    }
    for (name, amount) in [
      ("price", self.price),
      ("parts_cost", self.parts_cost),
      ("freight_cost", self.freight_cost),
    ] {
      check_amount(name, amount.flatten())?;
    }
    Ok(())
  }

  /// Applies the present fields to `record` and stamps `updated_at`.
  pub fn apply_to(&self, record: &mut SparePartRequest, now: DateTime<Utc>) {
    fn set<T: Clone>(target: &mut T, value: &Option<T>) {
      if let Some(v) = value {
        *target = v.clone();
      }
    }
    set(&mut record.customer_name, &self.customer_name);
    set(&mut record.phone_number, &self.phone_number);
    set(&mut record.email, &self.email);
    set(&mut record.vehicle_estamra, &self.vehicle_estamra);
    set(&mut record.vin_number, &self.vin_number);
    set(&mut record.part_name, &self.part_name);
    set(&mut record.status, &self.status);
    set(&mut record.payment_status, &self.payment_status);
    set(&mut record.price, &self.price);
    set(&mut record.parts_cost, &self.parts_cost);
    set(&mut record.freight_cost, &self.freight_cost);
    set(&mut record.payment_link, &self.payment_link);
    set(&mut record.whatsapp_sent, &self.whatsapp_sent);
    record.updated_at = now;
  }
}
