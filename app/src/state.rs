// app/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::flows;
use crate::services::mailer::{self, Mailer};
use crate::services::payment_gateway::{PaymentGateway, PaystackGateway};
use crate::store::{self, Store};
use carpluto_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
  pub gateway: Arc<dyn PaymentGateway>,
  pub mailer: Arc<dyn Mailer>,
}

impl AppState {
  /// Wires the given collaborators together and registers every flow.
  pub fn new(
    config: AppConfig,
    store: Arc<dyn Store>,
    gateway: Arc<dyn PaymentGateway>,
    mailer: Arc<dyn Mailer>,
  ) -> Result<Self> {
    let registry = FlowRegistry::new();
    flows::register_all_flows(&registry)?;
    Ok(Self {
      store,
      flows: Arc::new(registry),
      config: Arc::new(config),
      gateway,
      mailer,
    })
  }

  /// Production wiring: configured store backend, Paystack and Resend (or the log mailer).
  pub async fn from_config(config: AppConfig) -> Result<Self> {
    let store = store::connect(&config).await?;
    let gateway: Arc<dyn PaymentGateway> = Arc::new(PaystackGateway::from_config(&config)?);
    let mailer = mailer::from_config(&config)?;
    Self::new(config, store, gateway, mailer)
  }
}
