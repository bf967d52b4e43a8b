// app/src/web/extractors.rs

//! Request extractors for bearer-session authentication and the
//! maintenance gate.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{FeatureToggles, Profile};
use crate::services::auth_service;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::{debug, warn};

fn app_state(req: &HttpRequest) -> AppResult<AppState> {
  req
    .app_data::<web::Data<AppState>>()
    .map(|data| data.get_ref().clone())
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))
}

fn request_token(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(auth_service::bearer_token)
    .map(str::to_string)
}

/// Resolves a bearer token to its profile. Expired sessions are removed.
pub async fn resolve_session(state: &AppState, token: &str) -> AppResult<Profile> {
  let Some(session) = state.store.find_session(token).await? else {
    return Err(AppError::Auth("Session not found. Please sign in again.".to_string()));
  };
  if session.is_expired() {
    debug!(profile_id = %session.profile_id, "Expired session presented.");
    state.store.delete_session(token).await?;
    return Err(AppError::Auth("Session expired. Please sign in again.".to_string()));
  }
  state
    .store
    .get_profile(session.profile_id)
    .await?
    .ok_or_else(|| AppError::Auth("Account no longer exists.".to_string()))
}

/// Reads the toggles for this request; a failed read yields the safe defaults.
pub async fn current_toggles(state: &AppState) -> FeatureToggles {
  FeatureToggles::from_lookup(state.store.list_settings().await)
}

/// A signed-in caller.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub profile: Profile,
  pub token: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = request_token(req);
    Box::pin(async move {
      let state = state?;
      let Some(token) = token else {
        warn!("Request without a bearer token.");
        return Err(AppError::Auth("Authentication required.".to_string()));
      };
      let profile = resolve_session(&state, &token).await?;
      Ok(AuthenticatedUser { profile, token })
    })
  }
}

/// A signed-in caller with the `admin` or `super_admin` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Profile);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let user = AuthenticatedUser::from_request(req, payload);
    Box::pin(async move {
      let user = user.await?;
      if !user.profile.role().is_admin() {
        warn!(profile_id = %user.profile.id, "Non-admin hit an admin route.");
        return Err(AppError::Forbidden("Administrator access required.".to_string()));
      }
      Ok(AdminUser(user.profile))
    })
  }
}

/// Passes unless maintenance mode is on. Admins pass regardless.
#[derive(Debug, Clone, Copy)]
pub struct SiteOpen(pub FeatureToggles);

impl FromRequest for SiteOpen {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = app_state(req);
    let token = request_token(req);
    Box::pin(async move {
      let state = state?;
      let toggles = current_toggles(&state).await;
      if !toggles.maintenance_mode {
        return Ok(SiteOpen(toggles));
      }
      if let Some(token) = token {
        if let Ok(profile) = resolve_session(&state, &token).await {
          if profile.role().is_admin() {
            debug!(profile_id = %profile.id, "Admin bypassing maintenance mode.");
            return Ok(SiteOpen(toggles));
          }
        }
      }
      Err(AppError::Maintenance)
    })
  }
}
