// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use spareparts::{PgRequestStore, RequestStore};
use spareparts_server::config::AppConfig;
use spareparts_server::state::AppState;
use spareparts_server::web::{configure_app_routes, routes::not_found_handler};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env()) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting spare-parts request server...");

  let app_config = Arc::new(AppConfig::from_env().context("loading configuration")?);

  let db_pool = PgPoolOptions::new()
    .max_connections(10)
    .connect(&app_config.database_url)
    .await
    .context("connecting to the database")?;
  tracing::info!("Successfully connected to the database.");

  let pg_store = PgRequestStore::new(db_pool);
  if app_config.apply_schema {
    pg_store.ensure_schema().await.context("applying the schema")?;
  }
  let store: Arc<dyn RequestStore> = Arc::new(pg_store);

  let app_state = AppState::new(app_config.clone(), store).context("building application state")?;
  tracing::info!(
    messaging_configured = app_state.services().notifier.is_configured(),
    "Lifecycle pipelines ready."
  );

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
      .default_service(actix_data::to(not_found_handler))
  })
  .bind(&server_address)?
  .run()
  .await?;
  Ok(())
}
