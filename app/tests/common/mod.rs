// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use marketplace::config::{AppConfig, StoreBackend};
use marketplace::errors::{AppError, Result};
use marketplace::models::{Car, CarInput, NewProfile, Profile, Role};
use marketplace::services::auth_service;
use marketplace::services::mailer::{Email, Mailer, SentEmail};
use marketplace::services::payment_gateway::{CheckoutRequest, CheckoutSession, PaymentGateway, VerifiedTransaction};
use marketplace::state::AppState;
use marketplace::store::memory::MemoryStore;
use marketplace::store::Store;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::Level;

pub const WEBHOOK_SECRET: &str = "sk_test_marketplace";
pub const ADMIN_EMAIL: &str = "ops@carpluto.com";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Gateway double. Records the order's payment status at the moment
/// checkout is requested and answers verification with `verify_status`.
pub struct StubGateway {
  store: Arc<dyn Store>,
  pub fail_initialize: Mutex<bool>,
  pub verify_status: Mutex<String>,
  pub checkouts: Mutex<Vec<CheckoutRequest>>,
  pub payment_status_at_checkout: Mutex<Vec<Option<String>>>,
}

impl StubGateway {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self {
      store,
      fail_initialize: Mutex::new(false),
      verify_status: Mutex::new("success".to_string()),
      checkouts: Mutex::new(Vec::new()),
      payment_status_at_checkout: Mutex::new(Vec::new()),
    }
  }
}

#[async_trait]
impl PaymentGateway for StubGateway {
  async fn initialize(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
    let orders = self.store.list_orders(None).await?;
    let status = orders
      .iter()
      .find(|o| o.order_number == request.reference)
      .map(|o| o.payment_status.clone());
    self.payment_status_at_checkout.lock().push(status);
    self.checkouts.lock().push(request.clone());

    if *self.fail_initialize.lock() {
      return Err(AppError::Gateway("Paystack initialize failed: stubbed outage".to_string()));
    }
    Ok(CheckoutSession {
      authorization_url: format!("https://checkout.paystack.test/{}", request.reference),
      access_code: Some("stub-access".to_string()),
      reference: request.reference.clone(),
    })
  }

  async fn verify(&self, reference: &str) -> Result<VerifiedTransaction> {
    let status = self.verify_status.lock().clone();
    Ok(VerifiedTransaction {
      status: status.clone(),
      reference: reference.to_string(),
      data: serde_json::json!({ "status": status, "reference": reference }),
    })
  }
}

#[derive(Default)]
pub struct RecordingMailer {
  pub fail: Mutex<bool>,
  pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
  async fn send(&self, email: &Email) -> Result<SentEmail> {
    if *self.fail.lock() {
      return Err(AppError::Email("Resend rejected the message".to_string()));
    }
    let mut sent = self.sent.lock();
    sent.push(email.clone());
    Ok(SentEmail {
      id: format!("msg-{}", sent.len()),
    })
  }
}

impl RecordingMailer {
  pub fn subjects(&self) -> Vec<String> {
    self.sent.lock().iter().map(|e| e.subject.clone()).collect()
  }

  /// Token from the most recent reset link sent.
  pub fn last_reset_token(&self) -> Option<String> {
    const MARKER: &str = "reset-password?token=";
    let sent = self.sent.lock();
    let html = &sent.iter().rev().find(|e| e.html.contains(MARKER))?.html;
    let start = html.find(MARKER)? + MARKER.len();
    Some(html[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect())
  }
}

pub struct TestApp {
  pub state: AppState,
  pub store: Arc<dyn Store>,
  pub gateway: Arc<StubGateway>,
  pub mailer: Arc<RecordingMailer>,
}

pub fn test_config() -> AppConfig {
  AppConfig {
    store_backend: StoreBackend::Memory,
    site_url: "https://carpluto.test".to_string(),
    payment_callback_url: "https://carpluto.test/payment-success".to_string(),
    paystack_secret_key: Some(WEBHOOK_SECRET.to_string()),
    admin_emails: vec![ADMIN_EMAIL.to_string()],
    ..AppConfig::default()
  }
}

pub fn test_app() -> TestApp {
  setup_tracing();
  let store: Arc<dyn Store> = Arc::new(MemoryStore::with_default_settings());
  let gateway = Arc::new(StubGateway::new(store.clone()));
  let mailer = Arc::new(RecordingMailer::default());
  let state = AppState::new(test_config(), store.clone(), gateway.clone(), mailer.clone()).unwrap();
  TestApp {
    state,
    store,
    gateway,
    mailer,
  }
}

pub fn car_input(brand: &str, model: &str, price: i64) -> CarInput {
  CarInput {
    brand: brand.to_string(),
    model: model.to_string(),
    year: 2024,
    price,
    range_km: 420,
    battery_capacity: Some(64.0),
    acceleration_0_100: None,
    top_speed: None,
    charging_time_hours: None,
    exterior_color: None,
    interior_color: None,
    images: Vec::new(),
    features: Vec::new(),
    specifications: None,
    is_featured: false,
    availability_status: None,
  }
}

pub async fn add_car(app: &TestApp, brand: &str, model: &str, price: i64) -> Car {
  let car = Car::from_input(car_input(brand, model, price)).unwrap();
  app.store.insert_car(&car).await.unwrap()
}

/// Inserts a profile with the given role and returns it with a live bearer token.
pub async fn add_user(app: &TestApp, email: &str, role: Role) -> (Profile, String) {
  let profile = NewProfile {
    email: email.to_string(),
    password_hash: auth_service::hash_password("correct horse battery").unwrap(),
    full_name: Some("Test Driver".to_string()),
    phone: None,
    role,
  }
  .into_profile();
  let profile = app.store.insert_profile(&profile).await.unwrap();
  let session = auth_service::new_session(profile.id);
  app.store.insert_session(&session).await.unwrap();
  (profile, session.token)
}

pub fn bearer(token: &str) -> (&'static str, String) {
  ("Authorization", format!("Bearer {}", token))
}
