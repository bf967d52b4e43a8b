// app/src/web/handlers/auth.rs

use actix_web::{web, HttpResponse};
use carpluto_flow::{FlowData, FlowOutcome};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result as AppResult};
use crate::flows::contexts::{PasswordResetConfirmCtx, PasswordResetRequestCtx, SigninCtx, SignupCtx};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize)]
pub struct SignupRequestPayload {
  pub email: String,
  pub password: String,
  #[serde(default)]
  pub full_name: Option<String>,
  #[serde(default)]
  pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordResetRequestPayload {
  pub email: String,
}

#[derive(Deserialize)]
pub struct PasswordResetConfirmPayload {
  pub token: String,
  pub new_password: String,
}

const RESET_REQUESTED_MESSAGE: &str = "If an account exists for that email, a password reset link is on its way.";

#[instrument(name = "handler::signup", skip_all)]
pub async fn signup_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SignupRequestPayload>,
) -> AppResult<HttpResponse> {
  let payload = payload.into_inner();
  let ctx = FlowData::new(SignupCtx::new(
    app_state.get_ref().clone(),
    payload.email,
    payload.password,
    payload.full_name,
    payload.phone,
  ));

  if let FlowOutcome::Stopped = app_state.flows.run(ctx.clone()).await? {
    warn!("Signup flow stopped before completion.");
    return Err(AppError::Internal("Signup was halted before completion.".to_string()));
  }

  let (profile, session, welcome_email_sent) =
    ctx.with(|c| (c.profile.clone(), c.session.clone(), c.welcome_email_sent));
  let (Some(profile), Some(session)) = (profile, session) else {
    return Err(AppError::Internal("Signup completed without a profile or session.".to_string()));
  };
  info!(profile_id = %profile.id, "Signup complete.");

  Ok(HttpResponse::Created().json(json!({
    "profile": profile,
    "token": session.token,
    "expires_at": session.expires_at,
    "welcome_email_sent": welcome_email_sent,
  })))
}

#[instrument(name = "handler::signin", skip_all)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<SigninRequestPayload>,
) -> AppResult<HttpResponse> {
  let payload = payload.into_inner();
  let ctx = FlowData::new(SigninCtx::new(
    app_state.get_ref().clone(),
    payload.email,
    payload.password,
  ));
  app_state.flows.run(ctx.clone()).await?;

  let (profile, session) = ctx.with(|c| (c.profile.clone(), c.session.clone()));
  let (Some(profile), Some(session)) = (profile, session) else {
    return Err(AppError::Internal("Signin completed without a session.".to_string()));
  };
  info!(profile_id = %profile.id, "Signin complete.");

  Ok(HttpResponse::Ok().json(json!({
    "profile": profile,
    "token": session.token,
    "expires_at": session.expires_at,
  })))
}

#[instrument(name = "handler::signout", skip_all, fields(profile_id = %user.profile.id))]
pub async fn signout_handler(
  app_state: web::Data<AppState>,
  user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
  app_state.store.delete_session(&user.token).await?;
  info!("Session ended.");
  Ok(HttpResponse::NoContent().finish())
}

pub async fn me_handler(user: AuthenticatedUser) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "profile": user.profile }))
}

/// Same answer for known and unknown addresses.
#[instrument(name = "handler::password_reset_request", skip_all)]
pub async fn password_reset_request_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PasswordResetRequestPayload>,
) -> AppResult<HttpResponse> {
  let ctx = FlowData::new(PasswordResetRequestCtx::new(
    app_state.get_ref().clone(),
    payload.into_inner().email,
  ));
  app_state.flows.run(ctx).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": RESET_REQUESTED_MESSAGE })))
}

#[instrument(name = "handler::password_reset_confirm", skip_all)]
pub async fn password_reset_confirm_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<PasswordResetConfirmPayload>,
) -> AppResult<HttpResponse> {
  let payload = payload.into_inner();
  let ctx = FlowData::new(PasswordResetConfirmCtx::new(
    app_state.get_ref().clone(),
    payload.token,
    payload.new_password,
  ));
  app_state.flows.run(ctx.clone()).await?;

  let (profile_id, sessions_revoked) = ctx.with(|c| (c.profile.as_ref().map(|p| p.id), c.sessions_revoked));
  info!(?profile_id, sessions_revoked, "Password reset complete.");
  Ok(HttpResponse::Ok().json(json!({
    "message": "Your password has been updated. Please sign in again.",
    "sessions_revoked": sessions_revoked,
  })))
}
