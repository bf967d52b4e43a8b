// app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Where rows live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      "memory" => Ok(StoreBackend::Memory),
      other => Err(AppError::Config(format!("Unknown STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  /// Reads `LOG_FORMAT`; anything but `json` means pretty output.
  pub fn from_env() -> Self {
    match env_opt("LOG_FORMAT").as_deref() {
      Some(raw) if raw.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub run_migrations: bool,
  pub seed_db: bool,

  /// Public storefront URL, used for links in emails and the payment callback.
  pub site_url: String,
  pub brand_name: String,
  pub support_phone: String,

  pub paystack_secret_key: Option<String>,
  pub paystack_base_url: String,
  pub payment_callback_url: String,

  pub resend_api_key: Option<String>,
  pub resend_base_url: String,
  pub email_from_orders: String,
  pub email_from_bookings: String,
  pub email_from_welcome: String,

  /// Emails granted the `admin` role at sign-up.
  pub admin_emails: Vec<String>,
  pub log_format: LogFormat,
  pub http_timeout_secs: u64,
}

impl Default for AppConfig {
  fn default() -> Self {
    let site_url = "http://localhost:8080".to_string();
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Postgres,
      database_url: None,
      run_migrations: true,
      seed_db: false,
      payment_callback_url: format!("{}/payment-success", site_url),
      site_url,
      brand_name: "CARPLUTO".to_string(),
      support_phone: "+234-902-1475-523".to_string(),
      paystack_secret_key: None,
      paystack_base_url: "https://api.paystack.co".to_string(),
      resend_api_key: None,
      resend_base_url: "https://api.resend.com".to_string(),
      email_from_orders: "CARPLUTO Orders <orders@carpluto.com>".to_string(),
      email_from_bookings: "CARPLUTO Test Drives <bookings@carpluto.com>".to_string(),
      email_from_welcome: "CARPLUTO <welcome@carpluto.com>".to_string(),
      admin_emails: Vec::new(),
      log_format: LogFormat::Pretty,
      http_timeout_secs: 15,
    }
  }
}

fn env_opt(var_name: &str) -> Option<String> {
  env::var(var_name).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env_opt(var_name) {
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    None => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let defaults = Self::default();

    let store_backend = match env_opt("STORE_BACKEND") {
      Some(raw) => raw.parse::<StoreBackend>()?,
      None => defaults.store_backend,
    };
    let database_url = env_opt("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (or set STORE_BACKEND=memory)".to_string(),
      ));
    }

    let site_url = env_opt("SITE_URL")
      .map(|u| u.trim_end_matches('/').to_string())
      .unwrap_or(defaults.site_url);
    let payment_callback_url =
      env_opt("PAYMENT_CALLBACK_URL").unwrap_or_else(|| format!("{}/payment-success", site_url));

    let admin_emails = env_opt("ADMIN_EMAILS")
      .map(|raw| {
        raw
          .split(',')
          .map(|e| e.trim().to_ascii_lowercase())
          .filter(|e| !e.is_empty())
          .collect()
      })
      .unwrap_or_default();

    let log_format = LogFormat::from_env();

    let config = Self {
      server_host: env_opt("SERVER_HOST").unwrap_or(defaults.server_host),
      server_port: env_parse("SERVER_PORT", defaults.server_port)?,
      store_backend,
      database_url,
      run_migrations: env_parse("RUN_MIGRATIONS", defaults.run_migrations)?,
      seed_db: env_parse("SEED_DB", defaults.seed_db)?,
      site_url,
      brand_name: env_opt("BRAND_NAME").unwrap_or(defaults.brand_name),
      support_phone: env_opt("SUPPORT_PHONE").unwrap_or(defaults.support_phone),
      paystack_secret_key: env_opt("PAYSTACK_SECRET_KEY"),
      paystack_base_url: env_opt("PAYSTACK_BASE_URL").unwrap_or(defaults.paystack_base_url),
      payment_callback_url,
      resend_api_key: env_opt("RESEND_API_KEY"),
      resend_base_url: env_opt("RESEND_BASE_URL").unwrap_or(defaults.resend_base_url),
      email_from_orders: env_opt("EMAIL_FROM_ORDERS").unwrap_or(defaults.email_from_orders),
      email_from_bookings: env_opt("EMAIL_FROM_BOOKINGS").unwrap_or(defaults.email_from_bookings),
      email_from_welcome: env_opt("EMAIL_FROM_WELCOME").unwrap_or(defaults.email_from_welcome),
      admin_emails,
      log_format,
      http_timeout_secs: env_parse("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
    };

    tracing::info!(
      backend = ?config.store_backend,
      paystack = config.paystack_secret_key.is_some(),
      resend = config.resend_api_key.is_some(),
      "Application configuration loaded."
    );
    Ok(config)
  }

  pub fn is_admin_email(&self, email: &str) -> bool {
    let email = email.trim().to_ascii_lowercase();
    self.admin_emails.iter().any(|e| *e == email)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_backend_parses_known_names() {
    assert_eq!("memory".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
    assert_eq!(" Postgres ".parse::<StoreBackend>().unwrap(), StoreBackend::Postgres);
    assert!("sqlite".parse::<StoreBackend>().is_err());
  }

  #[test]
  fn admin_email_match_ignores_case() {
    let config = AppConfig {
      admin_emails: vec!["ops@carpluto.com".to_string()],
      ..AppConfig::default()
    };
    assert!(config.is_admin_email("OPS@carpluto.com"));
    assert!(!config.is_admin_email("someone@carpluto.com"));
  }
}
