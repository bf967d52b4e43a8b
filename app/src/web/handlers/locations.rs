// app/src/web/handlers/locations.rs

//! Charging-station map and showroom locations.

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::{AppError, Result as AppResult};
use crate::state::AppState;
use crate::web::extractors::SiteOpen;

pub async fn list_stations_handler(
  app_state: web::Data<AppState>,
  site: SiteOpen,
) -> AppResult<HttpResponse> {
  if !site.0.enable_charging_stations {
    return Err(AppError::NotFound("Charging station listings are not available.".to_string()));
  }
  let stations = app_state.store.list_stations().await?;
  Ok(HttpResponse::Ok().json(json!({ "count": stations.len(), "stations": stations })))
}

pub async fn list_dealerships_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
) -> AppResult<HttpResponse> {
  let dealerships = app_state.store.list_dealerships(true).await?;
  Ok(HttpResponse::Ok().json(json!({ "dealerships": dealerships })))
}
