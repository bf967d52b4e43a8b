// app/src/web/handlers/test_drives.rs

use actix_web::{web, HttpResponse};
use carpluto_flow::{FlowData, FlowOutcome};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::flows::contexts::{BookingRequest, Customer, TestDriveCtx};
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, SiteOpen};

#[derive(Debug, Deserialize)]
pub struct BookingPayload {
  pub car_id: Uuid,
  pub preferred_date: NaiveDate,
  pub preferred_time: String,
  pub pickup_location: String,
  pub driver_license_number: String,
  #[serde(default)]
  pub notes: Option<String>,
}

impl From<BookingPayload> for BookingRequest {
  fn from(p: BookingPayload) -> Self {
    BookingRequest {
      car_id: p.car_id,
      preferred_date: p.preferred_date,
      preferred_time: p.preferred_time,
      pickup_location: p.pickup_location,
      driver_license_number: p.driver_license_number,
      notes: p.notes,
    }
  }
}

#[instrument(
  name = "handler::book_test_drive",
  skip(app_state, _site, user, payload),
  fields(profile_id = %user.profile.id, car_id = %payload.car_id)
)]
pub async fn book_test_drive_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
  user: AuthenticatedUser,
  payload: web::Json<BookingPayload>,
) -> AppResult<HttpResponse> {
  let ctx = FlowData::new(TestDriveCtx::new(
    app_state.get_ref().clone(),
    Customer::from(&user.profile),
    payload.into_inner().into(),
  ));

  if let FlowOutcome::Stopped = app_state.flows.run(ctx.clone()).await? {
    warn!("Test-drive flow stopped before booking.");
    return Err(AppError::Internal("Booking was halted before completion.".to_string()));
  }

  let (booking, confirmation_sent) = ctx.with(|c| (c.booking.clone(), c.confirmation_sent));
  let booking =
    booking.ok_or_else(|| AppError::Internal("Test-drive flow completed without a booking.".to_string()))?;
  info!(booking_id = %booking.id, "Test drive booked.");

  Ok(HttpResponse::Created().json(json!({
    "booking": booking,
    "confirmation_sent": confirmation_sent,
  })))
}

pub async fn my_test_drives_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
  let test_drives = app_state.store.list_test_drives(Some(user.profile.id)).await?;
  Ok(HttpResponse::Ok().json(json!({ "test_drives": test_drives })))
}
