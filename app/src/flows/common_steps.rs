// app/src/flows/common_steps.rs

//! Step bodies shared by several flows.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Car, Session};
use crate::services::auth_service;
use crate::services::email_templates::RenderedEmail;
use crate::services::mailer::{Email, Mailer};
use crate::store::Store;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[instrument(name = "common_step::load_car", skip(store), err(Display))]
pub async fn load_car(store: &dyn Store, car_id: Uuid) -> AppResult<Car> {
  store
    .get_car(car_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found.", car_id)))
}

#[instrument(name = "common_step::issue_session", skip(store), err(Display))]
pub async fn issue_session(store: &dyn Store, profile_id: Uuid) -> AppResult<Session> {
  let session = auth_service::new_session(profile_id);
  store.insert_session(&session).await?;
  info!(%profile_id, expires_at = %session.expires_at, "Session issued.");
  Ok(session)
}

/// Sends a rendered email. Delivery failures are logged and reported as
/// `false`; they never fail the calling flow.
#[instrument(name = "common_step::deliver_email", skip(mailer, rendered), fields(subject = %rendered.subject))]
pub async fn deliver_email(mailer: &dyn Mailer, from: &str, to: &str, rendered: RenderedEmail) -> bool {
  let email = Email {
    from: from.to_string(),
    to: vec![to.to_string()],
    subject: rendered.subject,
    html: rendered.html,
  };
  match mailer.send(&email).await {
    Ok(sent) => {
      info!(message_id = %sent.id, "Email sent.");
      true
    }
    Err(e) => {
      warn!(error = %e, "Email delivery failed; continuing.");
      false
    }
  }
}
