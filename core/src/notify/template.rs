// core/src/notify/template.rs

//! Placeholder substitution for the three message kinds.
//!
//! Rendering is a single left-to-right scan. `{name}` is replaced when `name`
//! belongs to the kind's placeholder set, every time it occurs. Anything
//! else, including unknown placeholders and stray braces, is copied through
//! unchanged. Substituted values are never rescanned, and rendering cannot fail.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pricing::CURRENCY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
  Welcome,
  Payment,
  Dispatch,
}

impl MessageKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      MessageKind::Welcome => "welcome",
      MessageKind::Payment => "payment",
      MessageKind::Dispatch => "dispatch",
    }
  }

  pub fn placeholders(&self) -> &'static [&'static str] {
    match self {
      MessageKind::Welcome => &["customer_name", "part_name"],
      MessageKind::Payment => &["customer_name", "part_name", "payment_url", "total_amount", "currency"],
      MessageKind::Dispatch => &["customer_name", "part_name", "tracking_number", "order_id"],
    }
  }

  pub fn default_template(&self) -> &'static str {
    match self {
      MessageKind::Welcome => DEFAULT_WELCOME,
      MessageKind::Payment => DEFAULT_PAYMENT,
      MessageKind::Dispatch => DEFAULT_DISPATCH,
    }
  }
}

impl fmt::Display for MessageKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

pub const DEFAULT_WELCOME: &str = "Hello {customer_name}, thank you for your request for {part_name}. \
We have received it and will contact you shortly with pricing and availability.";

pub const DEFAULT_PAYMENT: &str = "Hello {customer_name}, your {part_name} is ready.\n\
Total amount: {total_amount} {currency}\n\
Complete your payment here: {payment_url}\n\
This link is valid for 24 hours.";

pub const DEFAULT_DISPATCH: &str = "Hello {customer_name}, good news! Your {part_name} for order {order_id} \
has been dispatched.\nTracking number: {tracking_number}\nThank you for choosing us.";

/// Values available to a template of a given kind.
pub trait TemplateVars {
  fn kind(&self) -> MessageKind;

  /// Value for a placeholder of this kind; `None` for names outside its set.
  fn lookup(&self, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WelcomeVars {
  pub customer_name: String,
  pub part_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentVars {
  pub customer_name: String,
  pub part_name: String,
  pub payment_url: String,
  pub total_amount: f64,
  /// Falls back to SAR when absent.
  pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchVars {
  pub customer_name: String,
  pub part_name: String,
  pub tracking_number: String,
  pub order_id: String,
}

impl TemplateVars for WelcomeVars {
  fn kind(&self) -> MessageKind {
    MessageKind::Welcome
  }

  fn lookup(&self, name: &str) -> Option<String> {
    match name {
      "customer_name" => Some(self.customer_name.clone()),
      "part_name" => Some(self.part_name.clone()),
      _ => None,
    }
  }
}

impl TemplateVars for PaymentVars {
  fn kind(&self) -> MessageKind {
    MessageKind::Payment
  }

  fn lookup(&self, name: &str) -> Option<String> {
    match name {
      "customer_name" => Some(self.customer_name.clone()),
      "part_name" => Some(self.part_name.clone()),
      "payment_url" => Some(self.payment_url.clone()),
      "total_amount" => Some(format!("{:.2}", self.total_amount)),
      "currency" => Some(
        self
          .currency
          .as_deref()
          .filter(|c| !c.trim().is_empty())
          .unwrap_or(CURRENCY)
          .to_string(),
      ),
      _ => None,
    }
  }
}

impl TemplateVars for DispatchVars {
  fn kind(&self) -> MessageKind {
    MessageKind::Dispatch
  }

  fn lookup(&self, name: &str) -> Option<String> {
    match name {
      "customer_name" => Some(self.customer_name.clone()),
      "part_name" => Some(self.part_name.clone()),
      "tracking_number" => Some(self.tracking_number.clone()),
      "order_id" => Some(self.order_id.clone()),
      _ => None,
    }
  }
}

/// Renders `template` with `vars`.
pub fn render(template: &str, vars: &dyn TemplateVars) -> String {
  let allowed = vars.kind().placeholders();
  let mut out = String::with_capacity(template.len());
  let mut rest = template;

  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after_open = &rest[open + 1..];
    let token = after_open.find('}').map(|close| (&after_open[..close], close));
    match token {
      Some((name, close)) if allowed.contains(&name) => {
        // `allowed` and `lookup` describe the same set, so this always yields a value.
        out.push_str(&vars.lookup(name).unwrap_or_default());
        rest = &after_open[close + 1..];
      }
      _ => {
        out.push('{');
        rest = after_open;
      }
    }
  }
  out.push_str(rest);
  out
}
