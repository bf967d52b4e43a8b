// app/src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLog {
  pub id: Uuid,
  pub admin_user_id: Option<Uuid>,
  pub action: String,
  pub resource_type: String,
  pub resource_id: Option<String>,
  pub old_values: Option<serde_json::Value>,
  pub new_values: Option<serde_json::Value>,
  pub user_agent: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAuditLog {
  pub admin_user_id: Option<Uuid>,
  pub action: String,
  pub resource_type: String,
  pub resource_id: Option<String>,
  pub old_values: Option<serde_json::Value>,
  pub new_values: Option<serde_json::Value>,
  pub user_agent: Option<String>,
}

impl NewAuditLog {
  pub fn into_log(self) -> AuditLog {
    AuditLog {
      id: Uuid::new_v4(),
      admin_user_id: self.admin_user_id,
      action: self.action,
      resource_type: self.resource_type,
      resource_id: self.resource_id,
      old_values: self.old_values,
      new_values: self.new_values,
      user_agent: self.user_agent,
      created_at: Utc::now(),
    }
  }
}
