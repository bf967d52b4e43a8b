// app/src/models/dealership.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Dealership {
  pub id: Uuid,
  pub name: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub features: Vec<String>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DealershipInput {
  pub name: String,
  pub address: String,
  pub city: String,
  pub state: String,
  #[serde(default)]
  pub phone: Option<String>,
  #[serde(default)]
  pub email: Option<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default = "default_active")]
  pub is_active: bool,
}

fn default_active() -> bool {
  true
}

impl DealershipInput {
  fn validate(&self) -> Result<()> {
    if [&self.name, &self.address, &self.city, &self.state]
      .iter()
      .any(|field| field.trim().is_empty())
    {
      return Err(AppError::Validation(
        "Dealership name, address, city and state are required.".to_string(),
      ));
    }
    if let Some(email) = &self.email {
      if !email.trim().is_empty() && !email.contains('@') {
        return Err(AppError::Validation("Dealership email is invalid.".to_string()));
      }
    }
    Ok(())
  }

  pub fn into_dealership(self) -> Result<Dealership> {
    self.validate()?;
    let now = Utc::now();
    Ok(Dealership {
      id: Uuid::new_v4(),
      name: self.name.trim().to_string(),
      address: self.address.trim().to_string(),
      city: self.city.trim().to_string(),
      state: self.state.trim().to_string(),
      phone: self.phone,
      email: self.email,
      features: self.features,
      is_active: self.is_active,
      created_at: now,
      updated_at: now,
    })
  }

  /// Applies the input to an existing row, keeping its id and creation time.
  pub fn apply_to(self, existing: &Dealership) -> Result<Dealership> {
    let mut updated = self.into_dealership()?;
    updated.id = existing.id;
    updated.created_at = existing.created_at;
    Ok(updated)
  }
}
