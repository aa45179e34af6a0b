// core/src/store/memory.rs

//! In-process `RequestStore` with the same semantics as the PostgreSQL one.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use super::{fold_status_counts, RequestFilter, RequestStats, RequestStore, StatusDistribution};
use crate::error::{LifecycleError, Result};
use crate::models::{NewRequest, PaymentStatus, RequestStatus, RequestUpdate, SparePartRequest};

#[derive(Debug, Default)]
struct Inner {
  rows: Vec<SparePartRequest>,
  last_timestamp: Option<DateTime<Utc>>,
}

impl Inner {
  /// Wall-clock time, nudged forward so consecutive timestamps never repeat.
  fn next_timestamp(&mut self) -> DateTime<Utc> {
    let now = Utc::now();
    let ts = match self.last_timestamp {
      Some(last) if now <= last => last + Duration::microseconds(1),
      _ => now,
    };
    self.last_timestamp = Some(ts);
    ts
  }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
  inner: RwLock<Inner>,
}

impl InMemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl RequestStore for InMemoryStore {
  #[instrument(name = "memory_store::list", skip(self))]
  async fn list(&self, filter: &RequestFilter) -> Result<Vec<SparePartRequest>> {
    filter.validate()?;
    let predicates = filter.predicates();
    let guard = self.inner.read();

    let mut rows: Vec<SparePartRequest> = guard
      .rows
      .iter()
      .filter(|r| predicates.iter().all(|p| p.matches(r)))
      .cloned()
      .collect();
    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let offset = filter.offset.unwrap_or(0) as usize;
    let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
    let page: Vec<SparePartRequest> = rows.into_iter().skip(offset).take(limit).collect();
    debug!(count = page.len(), "Listed requests.");
    Ok(page)
  }

  async fn get(&self, request_id: &str) -> Result<Option<SparePartRequest>> {
    Ok(self.inner.read().rows.iter().find(|r| r.request_id == request_id).cloned())
  }

  #[instrument(name = "memory_store::create", skip(self, new), fields(request_id = %new.request_id))]
  async fn create(&self, new: &NewRequest) -> Result<SparePartRequest> {
    new.validate()?;
    let mut guard = self.inner.write();
    if guard.rows.iter().any(|r| r.request_id == new.request_id) {
      return Err(LifecycleError::DuplicateKey(new.request_id.clone()));
    }
    let now = guard.next_timestamp();
    let record = SparePartRequest {
      request_id: new.request_id.clone(),
      customer_name: new.customer_name.clone(),
      phone_number: new.phone_number.clone(),
      email: new.email.clone(),
      vehicle_estamra: new.vehicle_estamra.clone(),
      vin_number: new.vin_number.clone(),
      part_name: new.part_name.clone(),
      status: new.status.clone().unwrap_or(RequestStatus::Pending),
      payment_status: new.payment_status.unwrap_or(PaymentStatus::Pending),
      price: new.price,
      parts_cost: new.parts_cost,
      freight_cost: new.freight_cost,
      payment_link: new.payment_link.clone(),
      whatsapp_sent: false,
      created_at: now,
      updated_at: now,
    };
    guard.rows.push(record.clone());
    Ok(record)
  }

  #[instrument(name = "memory_store::update", skip(self, update))]
  async fn update(&self, request_id: &str, update: &RequestUpdate) -> Result<Option<SparePartRequest>> {
    update.validate()?;
    let mut guard = self.inner.write();
    let now = guard.next_timestamp();
    let Some(record) = guard.rows.iter_mut().find(|r| r.request_id == request_id) else {
      debug!("No request matched.");
      return Ok(None);
    };
    update.apply_to(record, now);
    Ok(Some(record.clone()))
  }

  async fn stats(&self) -> Result<RequestStats> {
    let guard = self.inner.read();
    let rows = &guard.rows;
    let count_where = |pred: &dyn Fn(&SparePartRequest) -> bool| rows.iter().filter(|&r| pred(r)).count() as i64;
    let sum_of = |field: fn(&SparePartRequest) -> Option<f64>| rows.iter().filter_map(field).sum::<f64>();

    let priced: Vec<f64> = rows.iter().filter_map(|r| r.price).filter(|p| *p > 0.0).collect();
    let average_price = if priced.is_empty() {
      0.0
    } else {
      priced.iter().sum::<f64>() / priced.len() as f64
    };

    Ok(RequestStats {
      total_requests: rows.len() as i64,
      pending_requests: count_where(&|r| r.status == RequestStatus::Pending),
      pending_payments: count_where(&|r| r.payment_status == PaymentStatus::Pending),
      dispatched_requests: count_where(&|r| r.status == RequestStatus::Dispatched),
      total_price: sum_of(|r| r.price),
      total_parts_cost: sum_of(|r| r.parts_cost),
      total_freight_cost: sum_of(|r| r.freight_cost),
      average_price,
    })
  }

  async fn status_distribution(&self) -> Result<StatusDistribution> {
    let guard = self.inner.read();
    Ok(fold_status_counts(guard.rows.iter().map(|r| (r.status.as_str(), 1))))
  }
}
