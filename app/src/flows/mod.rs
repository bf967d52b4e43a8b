// app/src/flows/mod.rs

//! Every multi-step business process runs as a registered flow.

pub mod common_steps;
pub mod contexts;
pub mod password_reset_flow;
pub mod purchase_flow;
pub mod signin_flow;
pub mod signup_flow;
pub mod test_drive_flow;
pub mod verify_payment_flow;
pub mod webhook_flow;

use crate::errors::AppError;
use carpluto_flow::{FlowRegistry, FlowResult};
use tracing::info;

pub fn register_all_flows(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  signup_flow::register_signup_flow(registry)?;
  signin_flow::register_signin_flow(registry)?;
  password_reset_flow::register_password_reset_flows(registry)?;
  purchase_flow::register_purchase_flow(registry)?;
  verify_payment_flow::register_verify_payment_flow(registry)?;
  webhook_flow::register_webhook_flow(registry)?;
  test_drive_flow::register_test_drive_flow(registry)?;
  info!(flows = registry.len(), "All flows registered.");
  Ok(())
}
