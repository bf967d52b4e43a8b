// app/src/models/station.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChargingStation {
  pub id: Uuid,
  pub name: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub connector_types: Vec<String>,
  pub amenities: Vec<String>,
  pub power_output: Option<String>,
  pub pricing_per_kwh: Option<f64>,
  pub operating_hours: Option<String>,
  pub status: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationInput {
  pub name: String,
  pub address: String,
  pub city: String,
  pub state: String,
  #[serde(default)]
  pub latitude: Option<f64>,
  #[serde(default)]
  pub longitude: Option<f64>,
  #[serde(default)]
  pub connector_types: Vec<String>,
  #[serde(default)]
  pub amenities: Vec<String>,
  #[serde(default)]
  pub power_output: Option<String>,
  #[serde(default)]
  pub pricing_per_kwh: Option<f64>,
  #[serde(default)]
  pub operating_hours: Option<String>,
  #[serde(default)]
  pub status: Option<String>,
}

impl StationInput {
  pub fn into_station(self) -> Result<ChargingStation> {
    if [&self.name, &self.address, &self.city, &self.state]
      .iter()
      .any(|field| field.trim().is_empty())
    {
      return Err(AppError::Validation(
        "Station name, address, city and state are required.".to_string(),
      ));
    }
    let now = Utc::now();
    Ok(ChargingStation {
      id: Uuid::new_v4(),
      name: self.name.trim().to_string(),
      address: self.address.trim().to_string(),
      city: self.city.trim().to_string(),
      state: self.state.trim().to_string(),
      latitude: self.latitude,
      longitude: self.longitude,
      connector_types: self.connector_types,
      amenities: self.amenities,
      power_output: self.power_output,
      pricing_per_kwh: self.pricing_per_kwh,
      operating_hours: self.operating_hours,
      status: self.status.unwrap_or_else(|| "active".to_string()),
      created_at: now,
      updated_at: now,
    })
  }
}
