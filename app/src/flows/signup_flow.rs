// app/src/flows/signup_flow.rs

//! Account creation: validate, hash, persist, sign in, welcome.

use crate::errors::{AppError, Result as AppResult};
use crate::flows::common_steps;
use crate::flows::contexts::SignupCtx;
use crate::models::{NewProfile, Role};
use crate::services::{auth_service, email_templates};
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use tracing::{info, instrument, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn register_signup_flow(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut flow = Flow::<SignupCtx, AppError>::new(
    "signup",
    vec![
      StepDef::required("validate_signup_input"),
      StepDef::required("check_existing_user"),
      StepDef::required("create_profile"),
      StepDef::required("issue_session"),
      StepDef::optional("send_welcome_email"),
    ],
  );

  flow.on("validate_signup_input", validate_signup_input)?;
  flow.on("check_existing_user", check_existing_user)?;
  flow.on("create_profile", create_profile)?;
  flow.on("issue_session", issue_session)?;
  flow.on("send_welcome_email", send_welcome_email)?;

  registry.register(flow);
  info!("Signup flow registered.");
  Ok(())
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_ascii_lowercase()
}

#[instrument(name = "signup::validate_signup_input", skip_all, err(Display))]
async fn validate_signup_input(ctx: FlowData<SignupCtx>) -> AppResult<StepControl> {
  let (email, password_len) = ctx.with(|c| (normalize_email(&c.email), c.password.chars().count()));

  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation("A valid email address is required.".to_string()));
  }
  if password_len < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters.",
      MIN_PASSWORD_LEN
    )));
  }

  ctx.update(|c| {
    c.email = email;
    c.full_name = c.full_name.take().map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    c.phone = c.phone.take().map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "signup::check_existing_user", skip_all, err(Display))]
async fn check_existing_user(ctx: FlowData<SignupCtx>) -> AppResult<StepControl> {
  let (store, email) = ctx.with(|c| (c.app_state.store.clone(), c.email.clone()));
  if store.find_profile_by_email(&email).await?.is_some() {
    warn!("Signup attempted for an existing email.");
    return Err(AppError::Validation("An account with this email already exists.".to_string()));
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "signup::create_profile", skip_all, err(Display))]
async fn create_profile(ctx: FlowData<SignupCtx>) -> AppResult<StepControl> {
  let (store, new_profile) = {
    let guard = ctx.read();
    let role = if guard.app_state.config.is_admin_email(&guard.email) {
      Role::Admin
    } else {
      Role::User
    };
    let new_profile = NewProfile {
      email: guard.email.clone(),
      password_hash: auth_service::hash_password(&guard.password)?,
      full_name: guard.full_name.clone(),
      phone: guard.phone.clone(),
      role,
    };
    (guard.app_state.store.clone(), new_profile)
  };

  let profile = store.insert_profile(&new_profile.into_profile()).await?;
  info!(profile_id = %profile.id, role = %profile.role, "Profile created.");
  ctx.update(|c| {
    c.password.clear();
    c.profile = Some(profile);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "signup::issue_session", skip_all, err(Display))]
async fn issue_session(ctx: FlowData<SignupCtx>) -> AppResult<StepControl> {
  let (store, profile_id) = ctx.with(|c| (c.app_state.store.clone(), c.profile.as_ref().map(|p| p.id)));
  let profile_id =
    profile_id.ok_or_else(|| AppError::Internal("Profile missing before session issue.".to_string()))?;
  let session = common_steps::issue_session(store.as_ref(), profile_id).await?;
  ctx.write().session = Some(session);
  Ok(StepControl::Continue)
}

#[instrument(name = "signup::send_welcome_email", skip_all)]
async fn send_welcome_email(ctx: FlowData<SignupCtx>) -> AppResult<StepControl> {
  let Some((state, profile)) = ctx.with(|c| c.profile.clone().map(|p| (c.app_state.clone(), p))) else {
    return Ok(StepControl::Continue);
  };

  let rendered = email_templates::welcome(&state.config, &profile.greeting_name());
  let sent = common_steps::deliver_email(
    state.mailer.as_ref(),
    &state.config.email_from_welcome,
    &profile.email,
    rendered,
  )
  .await;
  ctx.write().welcome_email_sent = sent;
  Ok(StepControl::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn emails_are_trimmed_and_lowercased() {
    assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
  }
}
