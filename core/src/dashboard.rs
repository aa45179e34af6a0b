// core/src/dashboard.rs

use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::store::{RequestStats, RequestStore, StatusDistribution};

/// Dashboard payload: the store's aggregate figures plus its status histogram.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
  #[serde(flatten)]
  pub stats: RequestStats,
  pub status_distribution: StatusDistribution,
}

#[instrument(name = "dashboard::summarize", skip(store), err(Display))]
pub async fn summarize(store: &dyn RequestStore) -> Result<DashboardSummary> {
  let stats = store.stats().await?;
  let status_distribution = store.status_distribution().await?;
  Ok(DashboardSummary {
    stats,
    status_distribution,
  })
}
