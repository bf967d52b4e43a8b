// app/src/services/payment_gateway.rs

//! Hosted-checkout payment gateway (Paystack).

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Parameters of a hosted checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutRequest {
  pub email: String,
  /// Smallest currency unit (kobo).
  pub amount: i64,
  pub reference: String,
  pub callback_url: String,
  pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
  pub authorization_url: String,
  #[serde(default)]
  pub access_code: Option<String>,
  pub reference: String,
}

/// A transaction as reported by the gateway's verify endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedTransaction {
  /// Gateway status text, `success` when the charge went through.
  pub status: String,
  pub reference: String,
  /// The gateway's full transaction payload.
  pub data: serde_json::Value,
}

impl VerifiedTransaction {
  pub fn succeeded(&self) -> bool {
    self.status == "success"
  }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
  async fn initialize(&self, request: &CheckoutRequest) -> Result<CheckoutSession>;
  async fn verify(&self, reference: &str) -> Result<VerifiedTransaction>;
}

/// Paystack responses wrap their payload in `{status, message, data}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
  status: bool,
  #[serde(default)]
  message: String,
  data: Option<T>,
}

impl<T> Envelope<T> {
  fn into_data(self, action: &str) -> Result<T> {
    if !self.status {
      return Err(AppError::Gateway(format!("Paystack {} failed: {}", action, self.message)));
    }
    self
      .data
      .ok_or_else(|| AppError::Gateway(format!("Paystack {} returned no data", action)))
  }
}

pub struct PaystackGateway {
  client: reqwest::Client,
  base_url: String,
  secret_key: Option<String>,
}

impl PaystackGateway {
  pub fn new(base_url: impl Into<String>, secret_key: Option<String>, timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| AppError::Config(format!("Could not build HTTP client: {}", e)))?;
    Ok(Self {
      client,
      base_url: base_url.into().trim_end_matches('/').to_string(),
      secret_key,
    })
  }

  pub fn from_config(config: &AppConfig) -> Result<Self> {
    Self::new(
      config.paystack_base_url.clone(),
      config.paystack_secret_key.clone(),
      Duration::from_secs(config.http_timeout_secs),
    )
  }

  fn secret(&self) -> Result<&str> {
    self
      .secret_key
      .as_deref()
      .ok_or_else(|| AppError::Config("PAYSTACK_SECRET_KEY is not configured".to_string()))
  }

  async fn read_envelope<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<Envelope<T>> {
    let status = response.status();
    let body = response.text().await?;
    match serde_json::from_str::<Envelope<T>>(&body) {
      Ok(envelope) => Ok(envelope),
      Err(e) if status.is_success() => Err(AppError::Gateway(format!("Unreadable Paystack response: {}", e))),
      Err(_) => Err(AppError::Gateway(format!("Paystack responded with HTTP {}", status))),
    }
  }
}

#[async_trait]
impl PaymentGateway for PaystackGateway {
  #[instrument(name = "paystack::initialize", skip(self, request), fields(reference = %request.reference, amount = request.amount), err(Display))]
  async fn initialize(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
    let response = self
      .client
      .post(format!("{}/transaction/initialize", self.base_url))
      .bearer_auth(self.secret()?)
      .json(request)
      .send()
      .await?;
    let session = Self::read_envelope::<CheckoutSession>(response)
      .await?
      .into_data("initialize")?;
    info!(reference = %session.reference, "Paystack checkout session created.");
    Ok(session)
  }

  #[instrument(name = "paystack::verify", skip(self), err(Display))]
  async fn verify(&self, reference: &str) -> Result<VerifiedTransaction> {
    let response = self
      .client
      .get(format!("{}/transaction/verify/{}", self.base_url, reference))
      .bearer_auth(self.secret()?)
      .send()
      .await?;
    let data = Self::read_envelope::<serde_json::Value>(response)
      .await?
      .into_data("verify")?;

    let status = data
      .get("status")
      .and_then(|s| s.as_str())
      .unwrap_or("unknown")
      .to_string();
    if status != "success" {
      warn!(%status, "Paystack reports the transaction did not succeed.");
    }
    Ok(VerifiedTransaction {
      status,
      reference: reference.to_string(),
      data,
    })
  }
}

/// Checks an `x-paystack-signature` header: hex HMAC-SHA512 of the raw body
/// keyed with the secret key.
pub fn verify_webhook_signature(secret_key: &str, body: &[u8], signature_hex: &str) -> bool {
  let Ok(signature) = hex::decode(signature_hex.trim()) else {
    return false;
  };
  let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(secret_key.as_bytes()) else {
    return false;
  };
  mac.update(body);
  mac.verify_slice(&signature).is_ok()
}

/// Hex HMAC-SHA512 of `body`, as Paystack computes it.
pub fn sign_webhook_body(secret_key: &str, body: &[u8]) -> Result<String> {
  let mut mac = Hmac::<Sha512>::new_from_slice(secret_key.as_bytes())
    .map_err(|e| AppError::Internal(format!("Invalid HMAC key: {}", e)))?;
  mac.update(body);
  Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signature_round_trip_and_tamper_detection() {
    let body = br#"{"event":"charge.success","data":{"reference":"EV-1"}}"#;
    let signature = sign_webhook_body("sk_test_123", body).unwrap();
    assert_eq!(signature.len(), 128);

    assert!(verify_webhook_signature("sk_test_123", body, &signature));
    assert!(verify_webhook_signature("sk_test_123", body, &signature.to_uppercase()));
    assert!(!verify_webhook_signature("sk_test_other", body, &signature));
    assert!(!verify_webhook_signature("sk_test_123", b"{}", &signature));
    assert!(!verify_webhook_signature("sk_test_123", body, "zz"));
    assert!(!verify_webhook_signature("sk_test_123", body, &signature[..127]));
  }

  #[test]
  fn envelope_false_status_is_a_gateway_error() {
    let envelope: Envelope<serde_json::Value> =
      serde_json::from_str(r#"{"status":false,"message":"Transaction reference not found"}"#).unwrap();
    match envelope.into_data("verify") {
      Err(AppError::Gateway(message)) => assert!(message.contains("reference not found")),
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[tokio::test]
  async fn missing_secret_key_is_a_config_error() {
    let gateway = PaystackGateway::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
    assert!(matches!(gateway.verify("EV-1").await, Err(AppError::Config(_))));
  }
}
