// app/src/web/handlers/site.rs

//! Health, feature toggles and the content tools (financing, running
//! costs, newsletter).

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::services::{cost_calculator, financing};
use crate::state::AppState;
use crate::web::extractors::{current_toggles, SiteOpen};

pub async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[instrument(name = "handler::site_features", skip(app_state))]
pub async fn features_handler(app_state: web::Data<AppState>) -> HttpResponse {
  let toggles = current_toggles(&app_state).await;
  HttpResponse::Ok().json(toggles)
}

fn require_financing(site: &SiteOpen) -> AppResult<()> {
  if !site.0.enable_financing {
    return Err(AppError::NotFound("Financing is not available.".to_string()));
  }
  Ok(())
}

pub async fn finance_plans_handler(site: SiteOpen) -> AppResult<HttpResponse> {
  require_financing(&site)?;
  Ok(HttpResponse::Ok().json(json!({ "plans": financing::PLANS })))
}

#[derive(Debug, Deserialize)]
pub struct FinanceQuotePayload {
  pub tenure_months: u32,
  /// Price the quote against this car...
  #[serde(default)]
  pub car_id: Option<Uuid>,
  /// ...or against an explicit amount in naira.
  #[serde(default)]
  pub vehicle_price: Option<i64>,
}

#[instrument(name = "handler::finance_quote", skip(app_state, site), fields(tenure = payload.tenure_months))]
pub async fn finance_quote_handler(
  app_state: web::Data<AppState>,
  site: SiteOpen,
  payload: web::Json<FinanceQuotePayload>,
) -> AppResult<HttpResponse> {
  require_financing(&site)?;
  let plan = financing::find_plan(payload.tenure_months)?;

  let price = match (payload.car_id, payload.vehicle_price) {
    (Some(car_id), _) => {
      app_state
        .store
        .get_car(car_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found.", car_id)))?
        .price
    }
    (None, Some(price)) => price,
    (None, None) => {
      return Err(AppError::Validation("Either car_id or vehicle_price is required.".to_string()));
    }
  };

  let quote = financing::quote(plan, price)?;
  Ok(HttpResponse::Ok().json(quote))
}

pub async fn cost_calculator_handler(
  _site: SiteOpen,
  payload: web::Json<cost_calculator::CostInputs>,
) -> AppResult<HttpResponse> {
  let comparison = cost_calculator::compare(&payload)?;
  Ok(HttpResponse::Ok().json(json!({
    "inputs": {
      "distance_km": payload.distance_km,
      "charging": payload.charging,
    },
    "petrol": comparison.petrol,
    "ev": comparison.ev,
    "savings": comparison.savings,
  })))
}

#[derive(Debug, Deserialize)]
pub struct NewsletterPayload {
  pub email: String,
}

#[instrument(name = "handler::newsletter", skip_all)]
pub async fn newsletter_handler(payload: web::Json<NewsletterPayload>) -> AppResult<HttpResponse> {
  let email = payload.email.trim();
  if !email.contains('@') {
    return Err(AppError::Validation("Please enter a valid email address.".to_string()));
  }
  info!(domain = email.rsplit('@').next().unwrap_or_default(), "Newsletter signup received.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Thanks for subscribing! You'll hear about new arrivals first."
  })))
}
