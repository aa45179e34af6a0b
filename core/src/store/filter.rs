// core/src/store/filter.rs

//! Structured filter for listing requests.
//!
//! A [`RequestFilter`] is reduced to a list of [`Predicate`]s. Each predicate
//! can render itself as a SQL fragment with positionally bound values, or be
//! evaluated directly against a record, so the PostgreSQL and in-memory
//! stores agree on what a filter means.

use serde::Deserialize;

use super::query::QueryParams;
use crate::error::{LifecycleError, Result};
use crate::models::SparePartRequest;

/// Sentinel accepted by `status` / `payment_status` meaning "no filter".
pub const ALL_SENTINEL: &str = "all";

/// Columns searched by the free-text `search` filter.
pub const SEARCH_COLUMNS: [&str; 5] = [
  "customer_name",
  "vin_number",
  "part_name",
  "request_id",
  "phone_number",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RequestFilter {
  pub search: Option<String>,
  pub status: Option<String>,
  pub payment_status: Option<String>,
  pub limit: Option<i64>,
  pub offset: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
  /// Case-insensitive substring match OR-ed across [`SEARCH_COLUMNS`].
  Search(String),
  Status(String),
  PaymentStatus(String),
}

/// Trimming only decides blankness; the raw value is what gets matched.
fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

fn exact_value(value: &Option<String>) -> Option<String> {
  value
    .as_deref()
    .filter(|v| !is_blank(v) && *v != ALL_SENTINEL)
    .map(str::to_string)
}

impl RequestFilter {
  pub fn validate(&self) -> Result<()> {
    if self.limit.is_some_and(|l| l < 0) {
      return Err(LifecycleError::InvalidInput("limit must not be negative".to_string()));
    }
    if self.offset.is_some_and(|o| o < 0) {
      return Err(LifecycleError::InvalidInput("offset must not be negative".to_string()));
    }
    Ok(())
  }

  /// Predicates implied by the filter. Blank values and the `all` sentinel yield none.
  pub fn predicates(&self) -> Vec<Predicate> {
    let mut predicates = Vec::new();
    if let Some(term) = self.search.as_deref().filter(|t| !is_blank(t)) {
      predicates.push(Predicate::Search(term.to_string()));
    }
    if let Some(status) = exact_value(&self.status) {
      predicates.push(Predicate::Status(status));
    }
    if let Some(payment_status) = exact_value(&self.payment_status) {
      predicates.push(Predicate::PaymentStatus(payment_status));
    }
    predicates
  }
}

/// Escapes LIKE metacharacters so the term matches literally.
fn like_pattern(term: &str) -> String {
  let mut escaped = String::with_capacity(term.len() + 2);
  escaped.push('%');
  for ch in term.chars() {
    if matches!(ch, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(ch);
  }
  escaped.push('%');
  escaped
}

impl Predicate {
  /// Renders the predicate, binding its value through `params`.
  pub fn render(&self, params: &mut QueryParams) -> String {
    match self {
      Predicate::Search(term) => {
        let placeholder = params.push_text(like_pattern(term));
        let clauses: Vec<String> = SEARCH_COLUMNS
          .iter()
          .map(|col| format!("{} ILIKE {}", col, placeholder))
          .collect();
        format!("({})", clauses.join(" OR "))
      }
      Predicate::Status(value) => format!("status = {}", params.push_text(value.clone())),
      Predicate::PaymentStatus(value) => format!("payment_status = {}", params.push_text(value.clone())),
    }
  }

  pub fn matches(&self, record: &SparePartRequest) -> bool {
    match self {
      Predicate::Search(term) => {
        let needle = term.to_lowercase();
        [
          &record.customer_name,
          &record.vin_number,
          &record.part_name,
          &record.request_id,
          &record.phone_number,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
      }
      Predicate::Status(value) => record.status.as_str() == value,
      Predicate::PaymentStatus(value) => record.payment_status.as_str() == value,
    }
  }
}
