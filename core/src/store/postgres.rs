// core/src/store/postgres.rs

//! `RequestStore` over PostgreSQL via sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPool};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};
use tracing::{error, info, instrument, warn};

use super::query::{self, SqlQuery, SqlValue, STATS_QUERY, STATUS_COUNTS_QUERY};
use super::{fold_status_counts, RequestFilter, RequestStats, RequestStore, StatusDistribution};
use crate::error::{LifecycleError, Result};
use crate::models::{NewRequest, PaymentStatus, RequestStatus, RequestUpdate, SparePartRequest};

const SCHEMA_SQL: &str = include_str!("../../schema.sql");

/// Row shape as returned by the database; status columns are plain text.
#[derive(Debug, FromRow)]
struct RequestRow {
  request_id: String,
  customer_name: String,
  phone_number: String,
  email: String,
  vehicle_estamra: String,
  vin_number: String,
  part_name: String,
  status: String,
  payment_status: String,
  price: Option<f64>,
  parts_cost: Option<f64>,
  freight_cost: Option<f64>,
  payment_link: Option<String>,
  whatsapp_sent: bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for SparePartRequest {
  type Error = LifecycleError;

  fn try_from(row: RequestRow) -> Result<Self> {
    let payment_status: PaymentStatus = row.payment_status.parse().map_err(|_| {
      LifecycleError::Internal(format!(
        "request '{}' has unrecognised payment_status '{}'",
        row.request_id, row.payment_status
      ))
    })?;
    Ok(SparePartRequest {
      request_id: row.request_id,
      customer_name: row.customer_name,
      phone_number: row.phone_number,
      email: row.email,
      vehicle_estamra: row.vehicle_estamra,
      vin_number: row.vin_number,
      part_name: row.part_name,
      status: RequestStatus::from(row.status),
      payment_status,
      price: row.price,
      parts_cost: row.parts_cost,
      freight_cost: row.freight_cost,
      payment_link: row.payment_link,
      whatsapp_sent: row.whatsapp_sent,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

type RowQuery<'q> = QueryAs<'q, Postgres, RequestRow, PgArguments>;

fn bind_all(mut q: RowQuery<'_>, values: Vec<SqlValue>) -> RowQuery<'_> {
  for value in values {
    q = match value {
      SqlValue::Text(v) => q.bind(v),
      SqlValue::NullableText(v) => q.bind(v),
      SqlValue::NullableFloat(v) => q.bind(v),
      SqlValue::Bool(v) => q.bind(v),
      SqlValue::BigInt(v) => q.bind(v),
    };
  }
  q
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
  matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[derive(Debug, Clone)]
pub struct PgRequestStore {
  pool: PgPool,
}

impl PgRequestStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Creates the table and indexes if they are missing.
  #[instrument(name = "pg_store::ensure_schema", skip(self), err(Display))]
  pub async fn ensure_schema(&self) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    info!("spare_part_requests schema is in place.");
    Ok(())
  }

  async fn fetch_rows(&self, q: SqlQuery) -> Result<Vec<SparePartRequest>> {
    let rows = bind_all(sqlx::query_as::<_, RequestRow>(&q.sql), q.values)
      .fetch_all(&self.pool)
      .await
      .map_err(|e| {
        error!(error = %e, "Query on spare_part_requests failed.");
        LifecycleError::from(e)
      })?;
    rows.into_iter().map(SparePartRequest::try_from).collect()
  }

  async fn fetch_optional(&self, q: SqlQuery) -> Result<Option<SparePartRequest>> {
    let row = bind_all(sqlx::query_as::<_, RequestRow>(&q.sql), q.values)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| {
        error!(error = %e, "Query on spare_part_requests failed.");
        LifecycleError::from(e)
      })?;
    row.map(SparePartRequest::try_from).transpose()
  }
}

#[async_trait]
impl RequestStore for PgRequestStore {
  #[instrument(name = "pg_store::list", skip(self), err(Display))]
  async fn list(&self, filter: &RequestFilter) -> Result<Vec<SparePartRequest>> {
    filter.validate()?;
    self.fetch_rows(query::list_query(filter)).await
  }

  #[instrument(name = "pg_store::get", skip(self), err(Display))]
  async fn get(&self, request_id: &str) -> Result<Option<SparePartRequest>> {
    self.fetch_optional(query::get_query(request_id)).await
  }

  #[instrument(name = "pg_store::create", skip(self, new), fields(request_id = %new.request_id), err(Display))]
  async fn create(&self, new: &NewRequest) -> Result<SparePartRequest> {
    new.validate()?;
    let q = query::insert_query(new);
    let row = bind_all(sqlx::query_as::<_, RequestRow>(&q.sql), q.values)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          warn!("Request id already exists.");
          LifecycleError::DuplicateKey(new.request_id.clone())
        } else {
          error!(error = %e, "Insert into spare_part_requests failed.");
          LifecycleError::from(e)
        }
      })?;
    SparePartRequest::try_from(row)
  }

  #[instrument(name = "pg_store::update", skip(self, update), err(Display))]
  async fn update(&self, request_id: &str, update: &RequestUpdate) -> Result<Option<SparePartRequest>> {
    update.validate()?;
    self.fetch_optional(query::update_query(request_id, update)).await
  }

  #[instrument(name = "pg_store::stats", skip(self), err(Display))]
  async fn stats(&self) -> Result<RequestStats> {
    let stats = sqlx::query_as::<_, RequestStats>(STATS_QUERY)
      .fetch_one(&self.pool)
      .await?;
    Ok(stats)
  }

  #[instrument(name = "pg_store::status_distribution", skip(self), err(Display))]
  async fn status_distribution(&self) -> Result<StatusDistribution> {
    let rows = sqlx::query_as::<_, (String, i64)>(STATUS_COUNTS_QUERY)
      .fetch_all(&self.pool)
      .await?;
    Ok(fold_status_counts(rows))
  }
}
