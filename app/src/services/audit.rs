// app/src/services/audit.rs

use crate::models::NewAuditLog;
use crate::store::Store;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

/// Who performed an admin mutation.
#[derive(Debug, Clone)]
pub struct AuditActor {
  pub admin_user_id: Uuid,
  pub user_agent: Option<String>,
}

/// One admin mutation to record.
pub struct AuditEntry<'a> {
  pub action: &'a str,
  pub resource_type: &'a str,
  pub resource_id: Option<String>,
  pub old_values: Option<serde_json::Value>,
  pub new_values: Option<serde_json::Value>,
}

impl<'a> AuditEntry<'a> {
  pub fn new(action: &'a str, resource_type: &'a str, resource_id: impl ToString) -> Self {
    Self {
      action,
      resource_type,
      resource_id: Some(resource_id.to_string()),
      old_values: None,
      new_values: None,
    }
  }

  pub fn before(mut self, value: &impl Serialize) -> Self {
    self.old_values = serde_json::to_value(value).ok();
    self
  }

  pub fn after(mut self, value: &impl Serialize) -> Self {
    self.new_values = serde_json::to_value(value).ok();
    self
  }
}

/// Writes an audit row. A failed write is logged and otherwise ignored so it
/// never fails the mutation it describes.
pub async fn record(store: &dyn Store, actor: &AuditActor, entry: AuditEntry<'_>) {
  let log = NewAuditLog {
    admin_user_id: Some(actor.admin_user_id),
    action: entry.action.to_string(),
    resource_type: entry.resource_type.to_string(),
    resource_id: entry.resource_id,
    old_values: entry.old_values,
    new_values: entry.new_values,
    user_agent: actor.user_agent.clone(),
  }
  .into_log();

  match store.insert_audit_log(&log).await {
    Ok(()) => debug!(action = %log.action, resource = %log.resource_type, "Audit entry recorded."),
    Err(e) => warn!(error = %e, action = %log.action, resource = %log.resource_type, "Failed to record audit entry."),
  }
}
