// app/src/flows/password_reset_flow.rs

//! Forgot password: email a one-time link, then redeem it for a new password.

use crate::errors::{AppError, Result as AppResult};
use crate::flows::common_steps;
use crate::flows::contexts::{PasswordResetConfirmCtx, PasswordResetRequestCtx};
use crate::flows::signup_flow::{normalize_email, MIN_PASSWORD_LEN};
use crate::services::{auth_service, email_templates};
use carpluto_flow::{Flow, FlowData, FlowRegistry, FlowResult, StepControl, StepDef};
use tracing::{info, instrument, warn};

pub fn register_password_reset_flows(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut request = Flow::<PasswordResetRequestCtx, AppError>::new(
    "password_reset_request",
    vec![
      StepDef::required("find_account"),
      StepDef::required("issue_reset_token"),
      StepDef::optional("send_reset_email"),
    ],
  );
  request.on("find_account", find_account)?;
  request.on("issue_reset_token", issue_reset_token)?;
  request.on("send_reset_email", send_reset_email)?;
  registry.register(request);

  let mut confirm = Flow::<PasswordResetConfirmCtx, AppError>::new(
    "password_reset_confirm",
    vec![
      StepDef::required("validate_new_password"),
      StepDef::required("redeem_reset_token"),
      StepDef::required("store_new_password"),
      StepDef::required("revoke_sessions"),
    ],
  );
  confirm.on("validate_new_password", validate_new_password)?;
  confirm.on("redeem_reset_token", redeem_reset_token)?;
  confirm.on("store_new_password", store_new_password)?;
  confirm.on("revoke_sessions", revoke_sessions)?;
  registry.register(confirm);

  info!("Password reset flows registered.");
  Ok(())
}

/// Stops quietly for unknown addresses.
#[instrument(name = "password_reset::find_account", skip_all, err(Display))]
async fn find_account(ctx: FlowData<PasswordResetRequestCtx>) -> AppResult<StepControl> {
  let (store, email) = ctx.with(|c| (c.app_state.store.clone(), normalize_email(&c.email)));
  if email.is_empty() || !email.contains('@') {
    return Err(AppError::Validation("A valid email address is required.".to_string()));
  }

  let Some(profile) = store.find_profile_by_email(&email).await? else {
    info!("Password reset requested for an unknown email.");
    return Ok(StepControl::Stop);
  };
  ctx.update(|c| {
    c.email = email;
    c.profile = Some(profile);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "password_reset::issue_reset_token", skip_all, err(Display))]
async fn issue_reset_token(ctx: FlowData<PasswordResetRequestCtx>) -> AppResult<StepControl> {
  let (store, profile_id) = ctx.with(|c| (c.app_state.store.clone(), c.profile.as_ref().map(|p| p.id)));
  let profile_id =
    profile_id.ok_or_else(|| AppError::Internal("Profile missing before reset token issue.".to_string()))?;

  let (token, reset) = auth_service::new_password_reset(profile_id);
  store.replace_password_reset(&reset).await?;
  info!(%profile_id, expires_at = %reset.expires_at, "Password reset token issued.");
  ctx.write().reset_token = Some(token);
  Ok(StepControl::Continue)
}

#[instrument(name = "password_reset::send_reset_email", skip_all)]
async fn send_reset_email(ctx: FlowData<PasswordResetRequestCtx>) -> AppResult<StepControl> {
  let snapshot = ctx.with(|c| match (&c.profile, &c.reset_token) {
    (Some(profile), Some(token)) => Some((c.app_state.clone(), profile.clone(), token.clone())),
    _ => None,
  });
  let Some((state, profile, token)) = snapshot else {
    warn!("Reset email skipped: no token issued.");
    return Ok(StepControl::Continue);
  };

  let rendered = email_templates::password_reset(
    &state.config,
    &profile.greeting_name(),
    &token,
    auth_service::RESET_TOKEN_TTL_MINUTES,
  );
  let sent = common_steps::deliver_email(
    state.mailer.as_ref(),
    &state.config.email_from_welcome,
    &profile.email,
    rendered,
  )
  .await;
  ctx.write().reset_email_sent = sent;
  Ok(StepControl::Continue)
}

#[instrument(name = "password_reset::validate_new_password", skip_all, err(Display))]
async fn validate_new_password(ctx: FlowData<PasswordResetConfirmCtx>) -> AppResult<StepControl> {
  let (token_empty, password_len) = ctx.with(|c| (c.token.trim().is_empty(), c.new_password.chars().count()));
  if token_empty {
    return Err(AppError::Validation("Reset token is required.".to_string()));
  }
  if password_len < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters.",
      MIN_PASSWORD_LEN
    )));
  }
  Ok(StepControl::Continue)
}

#[instrument(name = "password_reset::redeem_reset_token", skip_all, err(Display))]
async fn redeem_reset_token(ctx: FlowData<PasswordResetConfirmCtx>) -> AppResult<StepControl> {
  let (store, token_hash) = ctx.with(|c| (c.app_state.store.clone(), auth_service::digest_reset_token(&c.token)));

  let reset = store
    .consume_password_reset(&token_hash)
    .await?
    .ok_or_else(|| AppError::Validation("This reset link is invalid or has expired.".to_string()))?;
  let profile = store
    .get_profile(reset.profile_id)
    .await?
    .ok_or_else(|| AppError::Validation("This reset link is invalid or has expired.".to_string()))?;

  ctx.update(|c| {
    c.token.clear();
    c.profile = Some(profile);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "password_reset::store_new_password", skip_all, err(Display))]
async fn store_new_password(ctx: FlowData<PasswordResetConfirmCtx>) -> AppResult<StepControl> {
  let (store, profile_id, password_hash) = {
    let guard = ctx.read();
    let profile_id = guard
      .profile
      .as_ref()
      .map(|p| p.id)
      .ok_or_else(|| AppError::Internal("Profile missing before password update.".to_string()))?;
    (
      guard.app_state.store.clone(),
      profile_id,
      auth_service::hash_password(&guard.new_password)?,
    )
  };

  let updated = store
    .set_profile_password(profile_id, &password_hash)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Profile {} not found.", profile_id)))?;
  info!(%profile_id, "Password updated from reset link.");
  ctx.update(|c| {
    c.new_password.clear();
    c.profile = Some(updated);
  });
  Ok(StepControl::Continue)
}

#[instrument(name = "password_reset::revoke_sessions", skip_all, err(Display))]
async fn revoke_sessions(ctx: FlowData<PasswordResetConfirmCtx>) -> AppResult<StepControl> {
  let (store, profile_id) = ctx.with(|c| (c.app_state.store.clone(), c.profile.as_ref().map(|p| p.id)));
  let profile_id =
    profile_id.ok_or_else(|| AppError::Internal("Profile missing before session revocation.".to_string()))?;

  let revoked = store.delete_sessions_for_profile(profile_id).await?;
  info!(%profile_id, revoked, "Existing sessions revoked.");
  ctx.write().sessions_revoked = revoked;
  Ok(StepControl::Continue)
}
