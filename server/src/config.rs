// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PAYMENT_BASE_URL: &str = "https://pay.example.com";
pub const DEFAULT_MESSAGING_DELAY_MS: u64 = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  /// Host serving the payment pages that session URLs point at.
  pub payment_base_url: String,
  pub notification_config_path: Option<PathBuf>,
  pub messaging_delay: Duration,

  pub admin_username: String,
  pub admin_password_hash: Option<String>,
  /// Plain-text fallback, hashed at startup when no hash is configured.
  pub admin_password: Option<String>,

  /// Apply the bundled schema on startup.
  pub apply_schema: bool,
}

fn parse_bool(name: &str, raw: Option<String>) -> Result<bool> {
  match raw {
    None => Ok(false),
    Some(v) => v
      .trim()
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid {} value: {}", name, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")
      .ok_or_else(|| AppError::Config("Missing environment variable 'DATABASE_URL'".to_string()))?;
    let payment_base_url = get_env("PAYMENT_BASE_URL").unwrap_or_else(|| DEFAULT_PAYMENT_BASE_URL.to_string());
    let notification_config_path = get_env("NOTIFICATION_CONFIG_PATH").map(PathBuf::from);
    let messaging_delay = match get_env("MESSAGING_DELAY_MS") {
      Some(raw) => raw
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| AppError::Config(format!("Invalid MESSAGING_DELAY_MS: {}", e)))?,
      None => Duration::from_millis(DEFAULT_MESSAGING_DELAY_MS),
    };

    let admin_username = get_env("ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());
    let admin_password_hash = get_env("ADMIN_PASSWORD_HASH");
    let admin_password = get_env("ADMIN_PASSWORD");
    let apply_schema = parse_bool("APPLY_SCHEMA", get_env("APPLY_SCHEMA"))?;

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      payment_base_url,
      notification_config_path,
      messaging_delay,
      admin_username,
      admin_password_hash,
      admin_password,
      apply_schema,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
