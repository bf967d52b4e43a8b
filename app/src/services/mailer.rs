// app/src/services/mailer.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, Serialize)]
pub struct Email {
  pub from: String,
  pub to: Vec<String>,
  pub subject: String,
  pub html: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentEmail {
  pub id: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
  async fn send(&self, email: &Email) -> Result<SentEmail>;
}

/// Delivers through the Resend HTTP API.
pub struct ResendMailer {
  client: reqwest::Client,
  base_url: String,
  api_key: String,
}

impl ResendMailer {
  pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Could not build HTTP client: {}", e)))?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      api_key: api_key.into(),
    })
  }
}

#[async_trait]
impl Mailer for ResendMailer {
  #[instrument(name = "resend::send", skip(self, email), fields(subject = %email.subject, recipients = email.to.len()), err(Display))]
  async fn send(&self, email: &Email) -> Result<SentEmail> {
    let response = self
      .client
      .post(format!("{}/emails", self.base_url))
      .bearer_auth(&self.api_key)
      .json(email)
      .send()
      .await
      .map_err(|e| AppError::Email(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
      let detail = response.text().await.unwrap_or_default();
      return Err(AppError::Email(format!("Resend responded with HTTP {}: {}", status, detail)));
    }
    let sent = response
      .json::<SentEmail>()
      .await
      .map_err(|e| AppError::Email(format!("Unreadable Resend response: {}", e)))?;
    info!(message_id = %sent.id, "Email accepted by Resend.");
    Ok(sent)
  }
}

/// Writes emails to the log instead of sending them. Used when no Resend
/// key is configured.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
  async fn send(&self, email: &Email) -> Result<SentEmail> {
    let message_id = format!("logged_{}", uuid::Uuid::new_v4());
    info!(
      to = ?email.to,
      from = %email.from,
      subject = %email.subject,
      %message_id,
      "Email delivery disabled, logging message instead."
    );
    Ok(SentEmail { id: message_id })
  }
}

pub fn from_config(config: &AppConfig) -> Result<std::sync::Arc<dyn Mailer>> {
  match &config.resend_api_key {
    Some(key) => Ok(std::sync::Arc::new(ResendMailer::new(
      config.resend_base_url.clone(),
      key.clone(),
      Duration::from_secs(config.http_timeout_secs),
    )?)),
    None => {
      tracing::warn!("RESEND_API_KEY not set; emails will only be logged.");
      Ok(std::sync::Arc::new(LogMailer))
    }
  }
}
