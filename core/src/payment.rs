// core/src/payment.rs

//! Payment sessions: an id, a hosted payment URL and a 24 hour expiry bound to
//! an order's cost breakdown. No payment provider is called; the URL scheme is
//! our own.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{LifecycleError, Result};
use crate::notify::{NotificationEngine, PaymentVars};
use crate::pricing::{self, CostBreakdown};

pub const SESSION_TTL_HOURS: i64 = 24;

/// Input to [`PaymentSessionGenerator::create_session`].
///
/// Costs stay loosely typed so that a missing value (`MissingField`) can be
/// told apart from a non-numeric one (`InvalidInput`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentOrder {
  pub order_id: Option<String>,
  pub customer_name: Option<String>,
  pub customer_email: Option<String>,
  pub part_name: Option<String>,
  pub parts_cost: Option<Value>,
  pub freight_cost: Option<Value>,
}

impl PaymentOrder {
  /// Fails with `InvalidInput` when either cost is not a finite number.
  pub fn new(
    order_id: impl Into<String>,
    customer_name: impl Into<String>,
    customer_email: impl Into<String>,
    part_name: impl Into<String>,
    parts_cost: f64,
    freight_cost: f64,
  ) -> Result<Self> {
    Ok(Self {
      order_id: Some(order_id.into()),
      customer_name: Some(customer_name.into()),
      customer_email: Some(customer_email.into()),
      part_name: Some(part_name.into()),
      parts_cost: Some(Self::cost_value("parts_cost", parts_cost)?),
      freight_cost: Some(Self::cost_value("freight_cost", freight_cost)?),
    })
  }

  fn cost_value(name: &str, amount: f64) -> Result<Value> {
    Number::from_f64(amount)
      .map(Value::Number)
      .ok_or_else(|| LifecycleError::InvalidInput(format!("{} must be a finite number", name)))
  }

  fn require_text<'a>(name: &str, value: &'a Option<String>) -> Result<&'a str> {
    value
      .as_deref()
      .filter(|v| !v.trim().is_empty())
      .ok_or_else(|| LifecycleError::MissingField(name.to_string()))
  }

  fn require_value<'a>(name: &str, value: &'a Option<Value>) -> Result<&'a Value> {
    value
      .as_ref()
      .filter(|v| !v.is_null())
      .ok_or_else(|| LifecycleError::MissingField(name.to_string()))
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSession {
  pub payment_id: String,
  pub payment_url: String,
  pub order_id: String,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub breakdown: CostBreakdown,
  /// Customer-facing payment message rendered for this session.
  pub message: String,
}

#[derive(Debug, Clone)]
pub struct PaymentSessionGenerator {
  base_url: String,
}

impl PaymentSessionGenerator {
  /// `base_url` is the host serving payment pages, e.g. `https://pay.example.com`.
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into().trim_end_matches('/').to_string(),
    }
  }

  /// Time-based prefix plus a short random suffix. Collisions are unlikely, not impossible.
  fn generate_payment_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("PAY-{}-{}", now.timestamp_millis(), suffix[..8].to_uppercase())
  }

  pub fn payment_url(&self, payment_id: &str) -> String {
    format!("{}/pay/{}", self.base_url, payment_id)
  }

  pub fn create_session(&self, order: &PaymentOrder, notifier: &NotificationEngine) -> Result<PaymentSession> {
    self.create_session_at(order, notifier, Utc::now())
  }

  #[instrument(name = "payment::create_session", skip(self, order, notifier), fields(order_id = ?order.order_id), err(Display))]
  pub fn create_session_at(
    &self,
    order: &PaymentOrder,
    notifier: &NotificationEngine,
    now: DateTime<Utc>,
  ) -> Result<PaymentSession> {
    let order_id = PaymentOrder::require_text("order_id", &order.order_id)?;
    let customer_name = PaymentOrder::require_text("customer_name", &order.customer_name)?;
    PaymentOrder::require_text("customer_email", &order.customer_email)?;
    let parts_cost = PaymentOrder::require_value("parts_cost", &order.parts_cost)?;
    let freight_cost = PaymentOrder::require_value("freight_cost", &order.freight_cost)?;

    let breakdown = pricing::breakdown_from_json(Some(parts_cost), Some(freight_cost))?;
    let payment_id = Self::generate_payment_id(now);
    let payment_url = self.payment_url(&payment_id);

    let message = notifier.render_payment(&PaymentVars {
      customer_name: customer_name.to_string(),
      part_name: order.part_name.clone().unwrap_or_default(),
      payment_url: payment_url.clone(),
      total_amount: breakdown.total_cost,
      currency: Some(breakdown.currency.clone()),
    });

    info!(%payment_id, total = breakdown.total_cost, "Payment session created.");
    Ok(PaymentSession {
      payment_id,
      payment_url,
      order_id: order_id.to_string(),
      created_at: now,
      expires_at: now + Duration::hours(SESSION_TTL_HOURS),
      breakdown,
      message,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn order() -> PaymentOrder {
    PaymentOrder::new("REQ-1", "Ali", "ali@example.com", "Filter", 250.0, 50.0).unwrap()
  }

  #[test]
  fn non_finite_costs_are_invalid_not_missing() {
    for (parts, freight, field) in [
      (f64::NAN, 50.0, "parts_cost"),
      (250.0, f64::INFINITY, "freight_cost"),
    ] {
      match PaymentOrder::new("REQ-1", "Ali", "ali@example.com", "Filter", parts, freight) {
        Err(LifecycleError::InvalidInput(msg)) => assert!(msg.contains(field), "{}", msg),
        other => panic!("expected InvalidInput for {}, got {:?}", field, other),
      }
    }
  }

  #[test]
  fn session_expires_exactly_one_day_later() {
    let generator = PaymentSessionGenerator::new("https://pay.example.com/");
    let now = Utc::now();
    let session = generator
      .create_session_at(&order(), &NotificationEngine::default(), now)
      .unwrap();
    assert_eq!(session.expires_at - session.created_at, Duration::hours(24));
    assert_eq!(
      session.payment_url,
      format!("https://pay.example.com/pay/{}", session.payment_id)
    );
    assert_eq!(session.breakdown.total_cost, 300.0);
    assert!(session.message.contains("300.00 SAR"));
    assert!(session.message.contains(&session.payment_url));
  }

  #[test]
  fn ids_differ_between_calls() {
    let generator = PaymentSessionGenerator::new("https://pay.example.com");
    let notifier = NotificationEngine::default();
    let now = Utc::now();
    let a = generator.create_session_at(&order(), &notifier, now).unwrap();
    let b = generator.create_session_at(&order(), &notifier, now).unwrap();
    assert_ne!(a.payment_id, b.payment_id);
  }

  #[test]
  fn each_required_field_is_enforced() {
    let generator = PaymentSessionGenerator::new("https://pay.example.com");
    let notifier = NotificationEngine::default();
    let cases: Vec<(&str, Box<dyn Fn(&mut PaymentOrder)>)> = vec![
      ("order_id", Box::new(|o| o.order_id = None)),
      ("customer_name", Box::new(|o| o.customer_name = Some(" ".into()))),
      ("customer_email", Box::new(|o| o.customer_email = None)),
      ("parts_cost", Box::new(|o| o.parts_cost = None)),
      ("freight_cost", Box::new(|o| o.freight_cost = Some(Value::Null))),
    ];
    for (field, strip) in cases {
      let mut o = order();
      strip(&mut o);
      match generator.create_session(&o, &notifier) {
        Err(LifecycleError::MissingField(name)) => assert_eq!(name, field),
        other => panic!("expected MissingField({}), got {:?}", field, other),
      }
    }
  }

  #[test]
  fn part_name_is_optional() {
    let generator = PaymentSessionGenerator::new("https://pay.example.com");
    let mut o = order();
    o.part_name = None;
    assert!(generator.create_session(&o, &NotificationEngine::default()).is_ok());
  }

  #[test]
  fn non_numeric_cost_is_invalid_input() {
    let generator = PaymentSessionGenerator::new("https://pay.example.com");
    let mut o = order();
    o.parts_cost = Some(json!("250"));
    assert!(matches!(
      generator.create_session(&o, &NotificationEngine::default()),
      Err(LifecycleError::InvalidInput(_))
    ));
  }
}
