// app/src/flows/signin_flow.rs

use crate::errors::{AppError, Result as AppResult};
use crate::flows::common_steps;
use crate::flows::contexts::SigninCtx;
use crate::flows::signup_flow::normalize_email;
use crate::services::auth_service;
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use tracing::{info, instrument, warn};

const INVALID_CREDENTIALS: &str = "Invalid email or password.";

pub fn register_signin_flow(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut flow = Flow::<SigninCtx, AppError>::new(
    "signin",
    vec![
      StepDef::required("lookup_profile"),
      StepDef::required("verify_credentials"),
      StepDef::required("issue_session"),
    ],
  );

  flow.on("lookup_profile", lookup_profile)?;
  flow.on("verify_credentials", verify_credentials)?;
  flow.on("issue_session", issue_session)?;

  registry.register(flow);
  info!("Signin flow registered.");
  Ok(())
}

#[instrument(name = "signin::lookup_profile", skip_all, err(Display))]
async fn lookup_profile(ctx: FlowData<SigninCtx>) -> AppResult<StepControl> {
  let (store, email) = ctx.with(|c| (c.app_state.store.clone(), normalize_email(&c.email)));
  if email.is_empty() {
    return Err(AppError::Validation("Email is required.".to_string()));
  }
  let Some(profile) = store.find_profile_by_email(&email).await? else {
    warn!("Signin attempted for an unknown email.");
    return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
  };
  ctx.update(|c| {
    c.email = email;
    c.profile = Some(profile);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "signin::verify_credentials", skip_all, err(Display))]
async fn verify_credentials(ctx: FlowData<SigninCtx>) -> AppResult<StepControl> {
  let matches = {
    let guard = ctx.read();
    let profile = guard
      .profile
      .as_ref()
      .ok_or_else(|| AppError::Internal("Profile not loaded before verification.".to_string()))?;
    auth_service::verify_password(&profile.password_hash, &guard.password)?
  };
  if !matches {
    warn!("Signin rejected: wrong password.");
    return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
  }
  ctx.write().password.clear();
  Ok(StepControl::Continue)
}

#[instrument(name = "signin::issue_session", skip_all, err(Display))]
async fn issue_session(ctx: FlowData<SigninCtx>) -> AppResult<StepControl> {
  let (store, profile_id) = ctx.with(|c| (c.app_state.store.clone(), c.profile.as_ref().map(|p| p.id)));
  let profile_id =
    profile_id.ok_or_else(|| AppError::Internal("Profile missing before session issue.".to_string()))?;
  let session = common_steps::issue_session(store.as_ref(), profile_id).await?;
  ctx.write().session = Some(session);
  Ok(StepControl::Continue)
}
