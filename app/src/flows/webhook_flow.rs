// app/src/flows/webhook_flow.rs

//! Paystack webhook: authenticate, parse, settle on `charge.success`.

use crate::errors::{AppError, Result as AppResult};
use crate::flows::contexts::PaystackWebhookCtx;
use crate::models::PaymentStatus;
use crate::services::payment_gateway::verify_webhook_signature;
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use serde::Deserialize;
use tracing::{info, instrument, warn};

pub const CHARGE_SUCCESS: &str = "charge.success";

#[derive(Debug, Deserialize)]
struct WebhookEvent {
  event: String,
  #[serde(default)]
  data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookData {
  #[serde(default)]
  reference: Option<String>,
}

pub fn register_webhook_flow(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut flow = Flow::<PaystackWebhookCtx, AppError>::new(
    "paystack_webhook",
    vec![
      StepDef::required("authenticate_webhook"),
      StepDef::required("parse_event"),
      StepDef::required("reconcile_order"),
    ],
  );

  flow.on("authenticate_webhook", authenticate_webhook)?;
  flow.on("parse_event", parse_event)?;
  flow.on("reconcile_order", reconcile_order)?;

  registry.register(flow);
  info!("Paystack webhook flow registered.");
  Ok(())
}

#[instrument(name = "webhook::authenticate", skip_all, err(Display))]
async fn authenticate_webhook(ctx: FlowData<PaystackWebhookCtx>) -> AppResult<StepControl> {
  let guard = ctx.read();
  let secret = guard
    .app_state
    .config
    .paystack_secret_key
    .as_deref()
    .ok_or_else(|| AppError::Config("PAYSTACK_SECRET_KEY is not configured".to_string()))?;
  let signature = guard
    .signature
    .as_deref()
    .ok_or_else(|| AppError::Auth("Missing x-paystack-signature header.".to_string()))?;

  if !verify_webhook_signature(secret, &guard.raw_body, signature) {
    warn!("Rejected webhook with an invalid signature.");
    return Err(AppError::Auth("Invalid webhook signature.".to_string()));
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "webhook::parse_event", skip_all, err(Display))]
async fn parse_event(ctx: FlowData<PaystackWebhookCtx>) -> AppResult<StepControl> {
  let event = {
    let guard = ctx.read();
    serde_json::from_slice::<WebhookEvent>(&guard.raw_body)
      .map_err(|e| AppError::Validation(format!("Malformed webhook payload: {}", e)))?
  };
  info!(event = %event.event, "Paystack event received.");

  let is_charge_success = event.event == CHARGE_SUCCESS;
  let reference = event.data.reference.filter(|r| !r.trim().is_empty());
  ctx.update(|c| {
    c.event = Some(event.event);
    c.reference = reference.clone();
  });

  if !is_charge_success {
    info!("Event acknowledged and ignored.");
    return Ok(StepControl::Stop);
  }
  if reference.is_none() {
    return Err(AppError::Validation("charge.success event carries no reference.".to_string()));
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "webhook::reconcile_order", skip_all, err(Display))]
async fn reconcile_order(ctx: FlowData<PaystackWebhookCtx>) -> AppResult<StepControl> {
  let (store, reference) = ctx.with(|c| (c.app_state.store.clone(), c.reference.clone()));
  let Some(reference) = reference else {
    return Err(AppError::Internal("Reconciliation ran without a reference.".to_string()));
  };

  let (payment_status, status) = PaymentStatus::settlement(true);
  let order = store
    .settle_order_by_reference(&reference, payment_status, status)
    .await?;
  match &order {
    Some(order) => info!(order_id = %order.id, %reference, "Order marked paid from webhook."),
    None => warn!(%reference, "Webhook reference matches no order."),
  }
  ctx.write().order = order;
  Ok(StepControl::Continue)
}
