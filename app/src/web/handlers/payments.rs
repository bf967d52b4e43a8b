// app/src/web/handlers/payments.rs

//! Payment verification after the hosted checkout redirects back.

use actix_web::{web, HttpResponse};
use carpluto_flow::FlowData;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::{AppError, Result as AppResult};
use crate::flows::contexts::VerifyPaymentCtx;
use crate::state::AppState;

/// Paystack appends both `reference` and `trxref` to the callback URL.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
  pub reference: Option<String>,
  pub trxref: Option<String>,
}

impl VerifyQuery {
  fn into_reference(self) -> String {
    self.reference.or(self.trxref).unwrap_or_default()
  }
}

async fn verify(app_state: &AppState, reference: String) -> AppResult<HttpResponse> {
  let ctx = FlowData::new(VerifyPaymentCtx::new(app_state.clone(), reference));
  app_state.flows.run(ctx.clone()).await?;

  let (transaction, order) = ctx.with(|c| (c.transaction.clone(), c.order.clone()));
  let transaction =
    transaction.ok_or_else(|| AppError::Internal("Verification finished without a transaction.".to_string()))?;
  let status = if transaction.succeeded() { "success" } else { "failed" };
  info!(reference = %transaction.reference, status, "Payment verified.");

  Ok(HttpResponse::Ok().json(json!({
    "status": status,
    "transaction": transaction,
    "order": order,
  })))
}

#[instrument(name = "handler::verify_payment_get", skip(app_state))]
pub async fn verify_payment_query_handler(
  app_state: web::Data<AppState>,
  query: web::Query<VerifyQuery>,
) -> AppResult<HttpResponse> {
  verify(&app_state, query.into_inner().into_reference()).await
}

#[instrument(name = "handler::verify_payment_post", skip(app_state))]
pub async fn verify_payment_body_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<VerifyQuery>,
) -> AppResult<HttpResponse> {
  verify(&app_state, payload.into_inner().into_reference()).await
}
