// app/src/flows/test_drive_flow.rs

//! Test-drive booking.

use crate::errors::{AppError, Result as AppResult};
use crate::flows::common_steps;
use crate::flows::contexts::TestDriveCtx;
use crate::models::NewTestDrive;
use crate::services::email_templates::{self, BookingDetails};
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use chrono::Utc;
use tracing::{info, instrument, warn};

pub fn register_test_drive_flow(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut flow = Flow::<TestDriveCtx, AppError>::new(
    "test_drive",
    vec![
      StepDef::required("validate_booking"),
      StepDef::required("create_booking"),
      StepDef::optional("send_booking_confirmation"),
    ],
  );

  flow.on("validate_booking", validate_booking)?;
  flow.on("create_booking", create_booking)?;
  flow.on("send_booking_confirmation", send_booking_confirmation)?;

  registry.register(flow);
  info!("Test-drive flow registered.");
  Ok(())
}

fn required(value: &str, field: &str) -> AppResult<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(AppError::Validation(format!("{} is required.", field)));
  }
  Ok(trimmed.to_string())
}

#[instrument(name = "test_drive::validate_booking", skip_all, err(Display))]
async fn validate_booking(ctx: FlowData<TestDriveCtx>) -> AppResult<StepControl> {
  let (store, car_id, date, time, location, licence) = ctx.with(|c| {
    (
      c.app_state.store.clone(),
      c.car_id,
      c.preferred_date,
      c.preferred_time.clone(),
      c.pickup_location.clone(),
      c.driver_license_number.clone(),
    )
  });

  if date < Utc::now().date_naive() {
    return Err(AppError::Validation("Preferred date cannot be in the past.".to_string()));
  }
  let time = required(&time, "Preferred time")?;
  let location = required(&location, "Pickup location")?;
  let licence = required(&licence, "Driver's licence number")?;

  let car = common_steps::load_car(store.as_ref(), car_id).await?;
  ctx.update(|c| {
    c.preferred_time = time;
    c.pickup_location = location;
    c.driver_license_number = licence;
    c.car = Some(car);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "test_drive::create_booking", skip_all, err(Display))]
async fn create_booking(ctx: FlowData<TestDriveCtx>) -> AppResult<StepControl> {
  let (store, new_booking) = ctx.with(|c| {
    (
      c.app_state.store.clone(),
      NewTestDrive {
        user_id: c.customer.user_id,
        car_id: c.car_id,
        preferred_date: c.preferred_date,
        preferred_time: c.preferred_time.clone(),
        pickup_location: c.pickup_location.clone(),
        driver_license_number: c.driver_license_number.clone(),
        notes: c.notes.clone().filter(|n| !n.trim().is_empty()),
      },
    )
  });

  let booking = store.insert_test_drive(&new_booking.into_test_drive()).await?;
  info!(booking_id = %booking.id, date = %booking.preferred_date, "Test drive booked.");
  ctx.write().booking = Some(booking);
  Ok(StepControl::Continue)
}

#[instrument(name = "test_drive::send_booking_confirmation", skip_all)]
async fn send_booking_confirmation(ctx: FlowData<TestDriveCtx>) -> AppResult<StepControl> {
  let snapshot = {
    let guard = ctx.read();
    match (&guard.booking, &guard.car) {
      (Some(booking), Some(car)) => Some((
        guard.app_state.clone(),
        guard.customer.clone(),
        booking.clone(),
        car.display_name(),
      )),
      _ => None,
    }
  };
  let Some((state, customer, booking, vehicle_name)) = snapshot else {
    warn!("Booking confirmation skipped: booking details missing.");
    return Ok(StepControl::Continue);
  };

  let booking_id = booking.id.to_string();
  let date = booking.preferred_date.format("%A, %B %-d, %Y").to_string();
  let rendered = email_templates::test_drive_confirmation(
    &state.config,
    &BookingDetails {
      customer_name: &customer.name,
      vehicle_name: &vehicle_name,
      booking_id: &booking_id,
      date: &date,
      time: &booking.preferred_time,
      location: &booking.pickup_location,
    },
  );
  let sent = common_steps::deliver_email(
    state.mailer.as_ref(),
    &state.config.email_from_bookings,
    &customer.email,
    rendered,
  )
  .await;
  ctx.write().confirmation_sent = sent;
  Ok(StepControl::Continue)
}
