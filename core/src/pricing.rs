// core/src/pricing.rs

//! Cost breakdown: parts + freight = total, in the single supported currency.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{LifecycleError, Result};

/// The only currency the system bills in.
pub const CURRENCY: &str = "SAR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
  pub parts_cost: f64,
  pub freight_cost: f64,
  pub total_cost: f64,
  pub currency: String,
}

fn check(name: &str, value: f64) -> Result<f64> {
  if !value.is_finite() {
    return Err(LifecycleError::InvalidInput(format!("{} must be a number", name)));
  }
  if value < 0.0 {
    return Err(LifecycleError::InvalidInput(format!("{} must not be negative", name)));
  }
  Ok(value)
}

/// Computes the breakdown. Pure: identical inputs give identical output.
pub fn breakdown(parts_cost: f64, freight_cost: f64) -> Result<CostBreakdown> {
  let parts_cost = check("parts_cost", parts_cost)?;
  let freight_cost = check("freight_cost", freight_cost)?;
  Ok(CostBreakdown {
    parts_cost,
    freight_cost,
    total_cost: parts_cost + freight_cost,
    currency: CURRENCY.to_string(),
  })
}

/// Reads an amount from loosely typed JSON input.
///
/// Only JSON numbers are accepted; `null`, a missing key, strings (even
/// numeric-looking ones) and other types are `InvalidInput`.
pub fn amount_from_json(name: &str, value: Option<&Value>) -> Result<f64> {
  match value {
    Some(Value::Number(n)) => n
      .as_f64()
      .ok_or_else(|| LifecycleError::InvalidInput(format!("{} is out of range", name))),
    Some(Value::Null) | None => Err(LifecycleError::InvalidInput(format!("{} is required", name))),
    Some(_) => Err(LifecycleError::InvalidInput(format!("{} must be a number", name))),
  }
}

/// `breakdown` over JSON inputs, as received from the HTTP layer.
pub fn breakdown_from_json(parts_cost: Option<&Value>, freight_cost: Option<&Value>) -> Result<CostBreakdown> {
  breakdown(
    amount_from_json("parts_cost", parts_cost)?,
    amount_from_json("freight_cost", freight_cost)?,
  )
}
