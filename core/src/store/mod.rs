// core/src/store/mod.rs

//! Persistence of spare-part requests.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::models::{normalize_status_label, NewRequest, RequestUpdate, SparePartRequest};

pub mod filter;
pub mod memory;
pub mod postgres;
pub mod query;

pub use filter::{Predicate, RequestFilter, ALL_SENTINEL};
pub use memory::InMemoryStore;
pub use postgres::PgRequestStore;

/// Aggregate figures over every stored request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, sqlx::FromRow)]
pub struct RequestStats {
  pub total_requests: i64,
  pub pending_requests: i64,
  pub pending_payments: i64,
  pub dispatched_requests: i64,
  pub total_price: f64,
  pub total_parts_cost: f64,
  pub total_freight_cost: f64,
  /// Mean over rows with `price > 0`; zero when there are none.
  pub average_price: f64,
}

/// Request count per normalized status label.
pub type StatusDistribution = BTreeMap<String, i64>;

/// Folds raw `(status, count)` pairs into normalized keys.
/// Labels differing only in case or spacing share a key and their counts add up.
pub fn fold_status_counts<I, S>(rows: I) -> StatusDistribution
where
  I: IntoIterator<Item = (S, i64)>,
  S: AsRef<str>,
{
  let mut distribution = StatusDistribution::new();
  for (status, count) in rows {
    *distribution.entry(normalize_status_label(status.as_ref())).or_insert(0) += count;
  }
  distribution
}

/// The record store contract.
///
/// Each call is independently durable; nothing here is transactional across
/// calls and no call is retried.
#[async_trait]
pub trait RequestStore: Send + Sync {
  /// Matching rows, newest `created_at` first, paginated after ordering.
  async fn list(&self, filter: &RequestFilter) -> Result<Vec<SparePartRequest>>;

  async fn get(&self, request_id: &str) -> Result<Option<SparePartRequest>>;

  /// Persists a new request. Fails with `DuplicateKey` if `request_id` is taken.
  async fn create(&self, new: &NewRequest) -> Result<SparePartRequest>;

  /// Applies a partial update. `Ok(None)` when no row has `request_id`.
  async fn update(&self, request_id: &str, update: &RequestUpdate) -> Result<Option<SparePartRequest>>;

  async fn stats(&self) -> Result<RequestStats>;

  async fn status_distribution(&self) -> Result<StatusDistribution>;
}
