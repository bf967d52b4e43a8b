// app/src/services/auth_service.rs

//! Password hashing, bearer-session issuance and reset tokens.

use crate::errors::AppError;
use crate::models::{PasswordReset, Session};
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{Duration, Utc};
use rand_core::RngCore;
use sha2::{Digest, Sha256};
use tracing::{debug, error, instrument};
use uuid::Uuid;

/// How long a sign-in stays valid.
pub const SESSION_TTL_DAYS: i64 = 7;

/// How long an emailed reset link stays valid.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unusable.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: passwords do not match.");
      Ok(false)
    }
    Err(other) => Err(AppError::Internal(format!(
      "Password verification process failed: {}",
      other
    ))),
  }
}

/// 32 random bytes from the OS, hex encoded.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

pub fn new_session(profile_id: Uuid) -> Session {
  let now = Utc::now();
  Session {
    token: generate_token(),
    profile_id,
    created_at: now,
    expires_at: now + Duration::days(SESSION_TTL_DAYS),
  }
}

/// The stored form of a reset token.
pub fn digest_reset_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.trim().as_bytes()))
}

/// A fresh reset grant and the plaintext token to email. Only the digest is
/// meant to be persisted.
pub fn new_password_reset(profile_id: Uuid) -> (String, PasswordReset) {
  let token = generate_token();
  let now = Utc::now();
  let reset = PasswordReset {
    token_hash: digest_reset_token(&token),
    profile_id,
    created_at: now,
    expires_at: now + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
    used_at: None,
  };
  (token, reset)
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
  let (scheme, token) = header_value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  let token = token.trim();
  (!token.is_empty()).then_some(token)
}
