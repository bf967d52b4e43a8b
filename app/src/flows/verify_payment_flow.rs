// app/src/flows/verify_payment_flow.rs

//! Verify payment: ask the gateway about a reference and settle the order.

use crate::errors::{AppError, Result as AppResult};
use crate::flows::contexts::VerifyPaymentCtx;
use crate::models::PaymentStatus;
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use tracing::{info, instrument, warn};

pub fn register_verify_payment_flow(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut flow = Flow::<VerifyPaymentCtx, AppError>::new(
    "verify_payment",
    vec![
      StepDef::required("require_reference"),
      StepDef::required("verify_with_gateway"),
      StepDef::required("reconcile_order"),
    ],
  );

  flow.on("require_reference", require_reference)?;
  flow.on("verify_with_gateway", verify_with_gateway)?;
  flow.on("reconcile_order", reconcile_order)?;

  registry.register(flow);
  info!("Verify-payment flow registered.");
  Ok(())
}

/// References are echoed into a gateway URL path, so only a conservative
/// character set is accepted.
pub fn is_valid_reference(reference: &str) -> bool {
  !reference.is_empty()
    && reference.len() <= 100
    && reference
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '='))
}

#[instrument(name = "verify::require_reference", skip_all, err(Display))]
async fn require_reference(ctx: FlowData<VerifyPaymentCtx>) -> AppResult<StepControl> {
  let reference = ctx.with(|c| c.reference.trim().to_string());
  if reference.is_empty() {
    return Err(AppError::Validation("Payment reference is required.".to_string()));
  }
  if !is_valid_reference(&reference) {
    return Err(AppError::Validation("Payment reference is malformed.".to_string()));
  }
  ctx.write().reference = reference;
  Ok(StepControl::Continue)
}

#[instrument(name = "verify::verify_with_gateway", skip_all, err(Display))]
async fn verify_with_gateway(ctx: FlowData<VerifyPaymentCtx>) -> AppResult<StepControl> {
  let (gateway, reference) = ctx.with(|c| (c.app_state.gateway.clone(), c.reference.clone()));
  let transaction = gateway.verify(&reference).await?;
  info!(%reference, gateway_status = %transaction.status, "Gateway verification received.");
  ctx.write().transaction = Some(transaction);
  Ok(StepControl::Continue)
}

#[instrument(name = "verify::reconcile_order", skip_all, err(Display))]
async fn reconcile_order(ctx: FlowData<VerifyPaymentCtx>) -> AppResult<StepControl> {
  let (store, reference, succeeded) = {
    let guard = ctx.read();
    let transaction = guard
      .transaction
      .as_ref()
      .ok_or_else(|| AppError::Internal("Reconciliation ran before verification.".to_string()))?;
    (guard.app_state.store.clone(), guard.reference.clone(), transaction.succeeded())
  };

  let (payment_status, status) = PaymentStatus::settlement(succeeded);
  let order = store
    .settle_order_by_reference(&reference, payment_status, status)
    .await?;
  match &order {
    Some(order) => info!(
      order_id = %order.id,
      %reference,
      payment_status = %payment_status,
      status = %status,
      "Order settled."
    ),
    None => warn!(%reference, "No order carries this payment reference."),
  }
  ctx.write().order = order;
  Ok(StepControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_charset() {
    assert!(is_valid_reference("EV-1761000000000-0A1F"));
    assert!(is_valid_reference("T123_abc.x"));
    assert!(!is_valid_reference(""));
    assert!(!is_valid_reference("../admin"));
    assert!(!is_valid_reference("EV 1"));
  }
}
