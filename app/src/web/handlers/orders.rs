// app/src/web/handlers/orders.rs

//! Purchase initiation, order lookup and the customer dashboard.

use actix_web::{web, HttpResponse};
use carpluto_flow::{FlowData, FlowOutcome};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::flows::contexts::{Customer, PurchaseCtx};
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, SiteOpen};

#[derive(Debug, Deserialize)]
pub struct PurchasePayload {
  pub car_id: Uuid,
  pub delivery_address: String,
  #[serde(default)]
  pub delivery_date: Option<NaiveDate>,
  #[serde(default)]
  pub notes: Option<String>,
}

#[instrument(
  name = "handler::purchase",
  skip(app_state, _site, user, payload),
  fields(profile_id = %user.profile.id, car_id = %payload.car_id)
)]
pub async fn purchase_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
  user: AuthenticatedUser,
  payload: web::Json<PurchasePayload>,
) -> AppResult<HttpResponse> {
  let payload = payload.into_inner();
  let ctx = FlowData::new(PurchaseCtx::new(
    app_state.get_ref().clone(),
    Customer::from(&user.profile),
    payload.car_id,
    payload.delivery_address,
    payload.delivery_date,
    payload.notes,
  ));

  if let FlowOutcome::Stopped = app_state.flows.run(ctx.clone()).await? {
    warn!("Purchase flow stopped before checkout.");
    return Err(AppError::Internal("Purchase was halted before checkout.".to_string()));
  }

  let (order, checkout, confirmation_sent) =
    ctx.with(|c| (c.order.clone(), c.checkout.clone(), c.confirmation_sent));
  let (Some(order), Some(checkout)) = (order, checkout) else {
    return Err(AppError::Internal("Purchase completed without a checkout session.".to_string()));
  };
  info!(order_id = %order.id, reference = %checkout.reference, "Purchase initiated.");

  Ok(HttpResponse::Created().json(json!({
    "order": order,
    "authorization_url": checkout.authorization_url,
    "reference": checkout.reference,
    "confirmation_sent": confirmation_sent,
  })))
}

/// The caller's own order; admins may read any order.
#[instrument(name = "handler::get_order", skip(app_state, user), fields(profile_id = %user.profile.id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
  order_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
  let order_id = order_id.into_inner();
  let not_found = || AppError::NotFound(format!("Order {} not found.", order_id));
  let order = app_state.store.get_order(order_id).await?.ok_or_else(not_found)?;
  if order.user_id != Some(user.profile.id) && !user.profile.role().is_admin() {
    return Err(not_found());
  }
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::dashboard", skip(app_state, user), fields(profile_id = %user.profile.id))]
pub async fn dashboard_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
  let orders = app_state.store.list_orders(Some(user.profile.id)).await?;
  let test_drives = app_state.store.list_test_drives(Some(user.profile.id)).await?;
  Ok(HttpResponse::Ok().json(json!({
    "profile": user.profile,
    "orders": orders,
    "test_drives": test_drives,
  })))
}
