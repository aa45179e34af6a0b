// core/src/store/query.rs

//! SQL text builders for `spare_part_requests`.
//!
//! Every value travels as a positional parameter (`$1..$n`); the SQL text
//! only ever contains column names and placeholders.

use super::filter::RequestFilter;
use crate::models::{NewRequest, RequestUpdate};

pub const TABLE: &str = "spare_part_requests";

pub const REQUEST_COLUMNS: &str = "request_id, customer_name, phone_number, email, vehicle_estamra, vin_number, \
   part_name, status, payment_status, price, parts_cost, freight_cost, payment_link, whatsapp_sent, \
   created_at, updated_at";

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
  Text(String),
  NullableText(Option<String>),
  NullableFloat(Option<f64>),
  Bool(bool),
  BigInt(i64),
}

/// Accumulates bound values and hands out their placeholders.
#[derive(Debug, Default)]
pub struct QueryParams {
  values: Vec<SqlValue>,
}

impl QueryParams {
  pub fn push(&mut self, value: SqlValue) -> String {
    self.values.push(value);
    format!("${}", self.values.len())
  }

  pub fn push_text(&mut self, value: String) -> String {
    self.push(SqlValue::Text(value))
  }

  pub fn into_values(self) -> Vec<SqlValue> {
    self.values
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
  pub sql: String,
  pub values: Vec<SqlValue>,
}

pub fn list_query(filter: &RequestFilter) -> SqlQuery {
  let mut params = QueryParams::default();
  let mut sql = format!("SELECT {} FROM {}", REQUEST_COLUMNS, TABLE);

  let clauses: Vec<String> = filter.predicates().iter().map(|p| p.render(&mut params)).collect();
  if !clauses.is_empty() {
    sql.push_str(" WHERE ");
    sql.push_str(&clauses.join(" AND "));
  }

  sql.push_str(" ORDER BY created_at DESC");
  if let Some(limit) = filter.limit {
    sql.push_str(&format!(" LIMIT {}", params.push(SqlValue::BigInt(limit))));
  }
  if let Some(offset) = filter.offset {
    sql.push_str(&format!(" OFFSET {}", params.push(SqlValue::BigInt(offset))));
  }

  SqlQuery {
    sql,
    values: params.into_values(),
  }
}

pub fn get_query(request_id: &str) -> SqlQuery {
  SqlQuery {
    sql: format!("SELECT {} FROM {} WHERE request_id = $1", REQUEST_COLUMNS, TABLE),
    values: vec![SqlValue::Text(request_id.to_string())],
  }
}

pub fn insert_query(new: &NewRequest) -> SqlQuery {
  let mut params = QueryParams::default();
  let columns = [
    ("request_id", SqlValue::Text(new.request_id.clone())),
    ("customer_name", SqlValue::Text(new.customer_name.clone())),
    ("phone_number", SqlValue::Text(new.phone_number.clone())),
    ("email", SqlValue::Text(new.email.clone())),
    ("vehicle_estamra", SqlValue::Text(new.vehicle_estamra.clone())),
    ("vin_number", SqlValue::Text(new.vin_number.clone())),
    ("part_name", SqlValue::Text(new.part_name.clone())),
    ("status", SqlValue::Text(new.status.clone().unwrap_or_default().into())),
    (
      "payment_status",
      SqlValue::Text(new.payment_status.unwrap_or_default().as_str().to_string()),
    ),
    ("price", SqlValue::NullableFloat(new.price)),
    ("parts_cost", SqlValue::NullableFloat(new.parts_cost)),
    ("freight_cost", SqlValue::NullableFloat(new.freight_cost)),
    ("payment_link", SqlValue::NullableText(new.payment_link.clone())),
    ("whatsapp_sent", SqlValue::Bool(false)),
  ];

  let names: Vec<&str> = columns.iter().map(|(name, _)| *name).collect();
  let placeholders: Vec<String> = columns.into_iter().map(|(_, v)| params.push(v)).collect();

  SqlQuery {
    sql: format!(
      "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
      TABLE,
      names.join(", "),
      placeholders.join(", "),
      REQUEST_COLUMNS
    ),
    values: params.into_values(),
  }
}

/// Builds the partial update. Callers must reject an empty update first;
/// `updated_at` is always refreshed and `created_at` is never touched.
pub fn update_query(request_id: &str, update: &RequestUpdate) -> SqlQuery {
  let mut params = QueryParams::default();
  let mut sets: Vec<String> = Vec::new();
  let mut set = |column: &str, value: SqlValue, params: &mut QueryParams| {
    sets.push(format!("{} = {}", column, params.push(value)));
  };

  let texts = [
    ("customer_name", &update.customer_name),
    ("phone_number", &update.phone_number),
    ("email", &update.email),
    ("vehicle_estamra", &update.vehicle_estamra),
    ("vin_number", &update.vin_number),
    ("part_name", &update.part_name),
  ];
  for (column, value) in texts {
    if let Some(v) = value {
      set(column, SqlValue::Text(v.clone()), &mut params);
    }
  }
  if let Some(status) = &update.status {
    set("status", SqlValue::Text(status.as_str().to_string()), &mut params);
  }
  if let Some(payment_status) = update.payment_status {
    set("payment_status", SqlValue::Text(payment_status.as_str().to_string()), &mut params);
  }
  for (column, value) in [
    ("price", update.price),
    ("parts_cost", update.parts_cost),
    ("freight_cost", update.freight_cost),
  ] {
    if let Some(v) = value {
      set(column, SqlValue::NullableFloat(v), &mut params);
    }
  }
  if let Some(link) = &update.payment_link {
    set("payment_link", SqlValue::NullableText(link.clone()), &mut params);
  }
  if let Some(sent) = update.whatsapp_sent {
    set("whatsapp_sent", SqlValue::Bool(sent), &mut params);
  }
  sets.push("updated_at = NOW()".to_string());

  let id_placeholder = params.push_text(request_id.to_string());
  SqlQuery {
    sql: format!(
      "UPDATE {} SET {} WHERE request_id = {} RETURNING {}",
      TABLE,
      sets.join(", "),
      id_placeholder,
      REQUEST_COLUMNS
    ),
    values: params.into_values(),
  }
}

pub const STATS_QUERY: &str = "SELECT \
   COUNT(*) AS total_requests, \
   COUNT(*) FILTER (WHERE status = 'Pending') AS pending_requests, \
   COUNT(*) FILTER (WHERE payment_status = 'Pending') AS pending_payments, \
   COUNT(*) FILTER (WHERE status = 'Dispatched') AS dispatched_requests, \
   COALESCE(SUM(price), 0)::FLOAT8 AS total_price, \
   COALESCE(SUM(parts_cost), 0)::FLOAT8 AS total_parts_cost, \
   COALESCE(SUM(freight_cost), 0)::FLOAT8 AS total_freight_cost, \
   COALESCE(AVG(price) FILTER (WHERE price > 0), 0)::FLOAT8 AS average_price \
   FROM spare_part_requests";

pub const STATUS_COUNTS_QUERY: &str =
  "SELECT status, COUNT(*) AS count FROM spare_part_requests GROUP BY status";

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{PaymentStatus, RequestStatus};

  #[test]
  fn unfiltered_list_orders_newest_first_without_params() {
    let q = list_query(&RequestFilter::default());
    assert!(q.sql.ends_with("ORDER BY created_at DESC"));
    assert!(!q.sql.contains("WHERE"));
    assert!(q.values.is_empty());
  }

  #[test]
  fn pagination_is_applied_after_ordering() {
    let filter = RequestFilter {
      status: Some("Pending".into()),
      payment_status: Some("all".into()),
      limit: Some(10),
      offset: Some(20),
      ..Default::default()
    };
    let q = list_query(&filter);
    assert!(q.sql.contains("WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"));
    assert_eq!(
      q.values,
      vec![
        SqlValue::Text("Pending".into()),
        SqlValue::BigInt(10),
        SqlValue::BigInt(20)
      ]
    );
  }

  #[test]
  fn update_sets_only_present_fields_and_refreshes_updated_at() {
    let update = RequestUpdate {
      status: Some(RequestStatus::Dispatched),
      payment_link: Some(None),
      ..Default::default()
    };
    let q = update_query("REQ-9", &update);
    assert_eq!(
      q.sql,
      format!(
        "UPDATE spare_part_requests SET status = $1, payment_link = $2, updated_at = NOW() \
         WHERE request_id = $3 RETURNING {}",
        REQUEST_COLUMNS
      )
    );
    assert!(!q.sql.contains("created_at ="));
    assert_eq!(q.values[2], SqlValue::Text("REQ-9".into()));
  }

  #[test]
  fn insert_applies_creation_defaults() {
    let new = NewRequest {
      request_id: "REQ-1".into(),
      ..Default::default()
    };
    let q = insert_query(&new);
    assert_eq!(q.values.len(), 14);
    assert_eq!(q.values[7], SqlValue::Text(RequestStatus::Pending.as_str().into()));
    assert_eq!(q.values[8], SqlValue::Text(PaymentStatus::Pending.as_str().into()));
    assert_eq!(q.values[13], SqlValue::Bool(false));
  }
}
