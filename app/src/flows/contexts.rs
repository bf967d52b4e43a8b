// app/src/flows/contexts.rs

//! The data each flow runs over. Handlers receive these wrapped in
//! `carpluto_flow::FlowData`.

use crate::models::{Car, Order, Profile, Session, TestDrive};
use crate::services::payment_gateway::{CheckoutSession, VerifiedTransaction};
use crate::state::AppState;
use actix_web::web::Bytes;
use chrono::NaiveDate;
use uuid::Uuid;

/// The signed-in buyer, as far as emails and gateway calls need them.
#[derive(Debug, Clone)]
pub struct Customer {
  pub user_id: Uuid,
  pub email: String,
  pub name: String,
}

impl From<&Profile> for Customer {
  fn from(profile: &Profile) -> Self {
    Self {
      user_id: profile.id,
      email: profile.email.clone(),
      name: profile.greeting_name(),
    }
  }
}

#[derive(Clone)]
pub struct PurchaseCtx {
  pub app_state: AppState,
  pub customer: Customer,
  pub car_id: Uuid,
  pub delivery_address: String,
  pub delivery_date: Option<NaiveDate>,
  pub notes: Option<String>,
  // Filled in by the flow:
  pub car: Option<Car>,
  pub amount_kobo: i64,
  pub order: Option<Order>,
  pub checkout: Option<CheckoutSession>,
  pub confirmation_sent: bool,
}

impl PurchaseCtx {
  pub fn new(
    app_state: AppState,
    customer: Customer,
    car_id: Uuid,
    delivery_address: String,
    delivery_date: Option<NaiveDate>,
    notes: Option<String>,
  ) -> Self {
    Self {
      app_state,
      customer,
      car_id,
      delivery_address,
      delivery_date,
      notes,
      car: None,
      amount_kobo: 0,
      order: None,
      checkout: None,
      confirmation_sent: false,
    }
  }
}

#[derive(Clone)]
pub struct VerifyPaymentCtx {
  pub app_state: AppState,
  pub reference: String,
  pub transaction: Option<VerifiedTransaction>,
  pub order: Option<Order>,
}

impl VerifyPaymentCtx {
  pub fn new(app_state: AppState, reference: String) -> Self {
    Self {
      app_state,
      reference,
      transaction: None,
      order: None,
    }
  }
}

#[derive(Clone)]
pub struct PaystackWebhookCtx {
  pub app_state: AppState,
  pub raw_body: Bytes,
  pub signature: Option<String>,
  pub event: Option<String>,
  pub reference: Option<String>,
  pub order: Option<Order>,
}

impl PaystackWebhookCtx {
  pub fn new(app_state: AppState, raw_body: Bytes, signature: Option<String>) -> Self {
    Self {
      app_state,
      raw_body,
      signature,
      event: None,
      reference: None,
      order: None,
    }
  }
}

#[derive(Clone)]
pub struct SignupCtx {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub profile: Option<Profile>,
  pub session: Option<Session>,
  pub welcome_email_sent: bool,
}

impl SignupCtx {
  pub fn new(
    app_state: AppState,
    email: String,
    password: String,
    full_name: Option<String>,
    phone: Option<String>,
  ) -> Self {
    Self {
      app_state,
      email,
      password,
      full_name,
      phone,
      profile: None,
      session: None,
      welcome_email_sent: false,
    }
  }
}

#[derive(Clone)]
pub struct SigninCtx {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub profile: Option<Profile>,
  pub session: Option<Session>,
}

impl SigninCtx {
  pub fn new(app_state: AppState, email: String, password: String) -> Self {
    Self {
      app_state,
      email,
      password,
      profile: None,
      session: None,
    }
  }
}

/// Forgot-password request. `reset_email_sent` stays private to the flow:
/// callers answer the same way whether or not the account exists.
#[derive(Clone)]
pub struct PasswordResetRequestCtx {
  pub app_state: AppState,
  pub email: String,
  pub profile: Option<Profile>,
  pub reset_token: Option<String>,
  pub reset_email_sent: bool,
}

impl PasswordResetRequestCtx {
  pub fn new(app_state: AppState, email: String) -> Self {
    Self {
      app_state,
      email,
      profile: None,
      reset_token: None,
      reset_email_sent: false,
    }
  }
}

#[derive(Clone)]
pub struct PasswordResetConfirmCtx {
  pub app_state: AppState,
  pub token: String,
  pub new_password: String,
  pub profile: Option<Profile>,
  pub sessions_revoked: u64,
}

impl PasswordResetConfirmCtx {
  pub fn new(app_state: AppState, token: String, new_password: String) -> Self {
    Self {
      app_state,
      token,
      new_password,
      profile: None,
      sessions_revoked: 0,
    }
  }
}

#[derive(Clone)]
pub struct TestDriveCtx {
  pub app_state: AppState,
  pub customer: Customer,
  pub car_id: Uuid,
  pub preferred_date: NaiveDate,
  pub preferred_time: String,
  pub pickup_location: String,
  pub driver_license_number: String,
  pub notes: Option<String>,
  pub car: Option<Car>,
  pub booking: Option<TestDrive>,
  pub confirmation_sent: bool,
}

/// Booking fields as submitted.
#[derive(Debug, Clone)]
pub struct BookingRequest {
  pub car_id: Uuid,
  pub preferred_date: NaiveDate,
  pub preferred_time: String,
  pub pickup_location: String,
  pub driver_license_number: String,
  pub notes: Option<String>,
}

impl TestDriveCtx {
  pub fn new(app_state: AppState, customer: Customer, request: BookingRequest) -> Self {
    Self {
      app_state,
      customer,
      car_id: request.car_id,
      preferred_date: request.preferred_date,
      preferred_time: request.preferred_time,
      pickup_location: request.pickup_location,
      driver_license_number: request.driver_license_number,
      notes: request.notes,
      car: None,
      booking: None,
      confirmation_sent: false,
    }
  }
}
