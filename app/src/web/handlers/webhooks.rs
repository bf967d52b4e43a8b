// app/src/web/handlers/webhooks.rs

use actix_web::{web, HttpRequest, HttpResponse};
use carpluto_flow::{FlowData, FlowOutcome};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::Result as AppResult;
use crate::flows::contexts::PaystackWebhookCtx;
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

#[instrument(name = "handler::paystack_webhook", skip_all, fields(body_len = body.len()))]
pub async fn paystack_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  body: web::Bytes,
) -> AppResult<HttpResponse> {
  let signature = req
    .headers()
    .get(SIGNATURE_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string);

  let ctx = FlowData::new(PaystackWebhookCtx::new(app_state.get_ref().clone(), body, signature));
  let outcome = app_state.flows.run(ctx.clone()).await?;

  let (event, order_id) = ctx.with(|c| (c.event.clone(), c.order.as_ref().map(|o| o.id)));
  let handled = matches!(outcome, FlowOutcome::Completed);
  info!(event = ?event, handled, order_id = ?order_id, "Webhook acknowledged.");

  // Paystack retries anything other than a 200.
  Ok(HttpResponse::Ok().json(json!({
    "received": true,
    "event": event,
    "handled": handled,
    "order_id": order_id,
  })))
}
