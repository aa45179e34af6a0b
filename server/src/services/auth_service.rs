// server/src/services/auth_service.rs

//! Operator login: argon2 password hashing and verification against the single
//! configured back-office account.

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Hashes a plain-text password into an argon2 PHC string.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty for hashing.".to_string()));
  }
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", e))
    })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unusable.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }
  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|e| {
    error!(error = %e, "Failed to parse stored password hash string.");
    AppError::Config(format!("Invalid stored password hash format: {}", e))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(e) => {
      error!(error = %e, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!("Password verification process failed: {}", e)))
    }
  }
}

/// The back-office account allowed to log in.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
  pub username: String,
  password_hash: Option<String>,
}

impl AdminCredentials {
  /// Prefers a configured hash; otherwise hashes the plain password. With
  /// neither, every login attempt fails.
  pub fn from_config(
    username: &str,
    password_hash: Option<&str>,
    password: Option<&str>,
  ) -> Result<Self, AppError> {
    let password_hash = match (password_hash, password) {
      (Some(hash), _) => {
        PasswordHash::new(hash).map_err(|e| AppError::Config(format!("ADMIN_PASSWORD_HASH is not a valid PHC string: {}", e)))?;
        Some(hash.to_string())
      }
      (None, Some(plain)) => Some(hash_password(plain)?),
      (None, None) => {
        warn!("No operator password configured; logins will be refused.");
        None
      }
    };
    Ok(Self {
      username: username.to_string(),
      password_hash,
    })
  }

  /// Checks a login attempt and returns a fresh session token.
  #[instrument(name = "auth_service::authenticate", skip(self, password), err(Display))]
  pub fn authenticate(&self, username: &str, password: &str) -> Result<String, AppError> {
    let Some(hash) = self.password_hash.as_deref() else {
      return Err(AppError::Auth("Invalid username or password.".to_string()));
    };
    let password_ok = verify_password(hash, password)?;
    if username != self.username || !password_ok {
      warn!("Operator login rejected.");
      return Err(AppError::Auth("Invalid username or password.".to_string()));
    }
    info!("Operator logged in.");
    Ok(format!("session_{}", Uuid::new_v4().simple()))
  }
}
