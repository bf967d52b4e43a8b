// app/src/models/profile.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

string_enum!(
  Role {
    User => "user",
    Admin => "admin",
    SuperAdmin => "super_admin",
  }
);

impl Role {
  pub fn is_admin(self) -> bool {
    matches!(self, Role::Admin | Role::SuperAdmin)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub role: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Profile {
  /// Unknown role text is treated as a plain user.
  pub fn role(&self) -> Role {
    self.role.parse().unwrap_or(Role::User)
  }

  /// Name used to greet the user in emails.
  pub fn greeting_name(&self) -> String {
    match self.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
      Some(name) => name.to_string(),
      None => self.email.split('@').next().unwrap_or("there").to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewProfile {
  pub email: String,
  pub password_hash: String,
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub role: Role,
}

impl NewProfile {
  pub fn into_profile(self) -> Profile {
    let now = Utc::now();
    Profile {
      id: Uuid::new_v4(),
      email: self.email,
      password_hash: self.password_hash,
      full_name: self.full_name,
      phone: self.phone,
      role: self.role.as_str().to_string(),
      created_at: now,
      updated_at: now,
    }
  }
}

/// Bearer session issued at sign-in.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
  pub token: String,
  pub profile_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn is_expired(&self) -> bool {
    self.expires_at <= Utc::now()
  }
}

/// One-time password reset grant. Only the digest of the emailed token is kept.
#[derive(Debug, Clone, FromRow)]
pub struct PasswordReset {
  pub token_hash: String,
  pub profile_id: Uuid,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
  pub used_at: Option<DateTime<Utc>>,
}

impl PasswordReset {
  pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
    self.used_at.is_none() && self.expires_at > now
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn admin_roles() {
    assert!(Role::Admin.is_admin());
    assert!(Role::SuperAdmin.is_admin());
    assert!(!Role::User.is_admin());
  }

  #[test]
  fn greeting_falls_back_to_email_local_part() {
    let profile = NewProfile {
      email: "ada@example.com".into(),
      password_hash: String::new(),
      full_name: Some("  ".into()),
      phone: None,
      role: Role::User,
    }
    .into_profile();
    assert_eq!(profile.greeting_name(), "ada");
    assert_eq!(profile.role(), Role::User);
  }

  #[test]
  fn reset_grants_expire_and_are_single_use() {
    let now = Utc::now();
    let mut reset = PasswordReset {
      token_hash: "digest".into(),
      profile_id: Uuid::new_v4(),
      created_at: now,
      expires_at: now + chrono::Duration::hours(1),
      used_at: None,
    };
    assert!(reset.is_redeemable(now));
    assert!(!reset.is_redeemable(now + chrono::Duration::hours(2)));
    reset.used_at = Some(now);
    assert!(!reset.is_redeemable(now));
  }
}
