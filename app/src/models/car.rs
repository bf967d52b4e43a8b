// app/src/models/car.rs

use crate::errors::{AppError, Result};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

string_enum!(
  /// Catalog availability of a vehicle.
  AvailabilityStatus {
    Available => "available",
    Reserved => "reserved",
    Sold => "sold",
    ComingSoon => "coming_soon",
  }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Car {
  pub id: Uuid,
  pub brand: String,
  pub model: String,
  pub year: i32,
  /// Whole naira.
  pub price: i64,
  pub range_km: i32,
  pub battery_capacity: Option<f64>,
  pub acceleration_0_100: Option<f64>,
  pub top_speed: Option<i32>,
  pub charging_time_hours: Option<f64>,
  pub exterior_color: Option<String>,
  pub interior_color: Option<String>,
  pub images: Vec<String>,
  pub features: Vec<String>,
  pub specifications: Option<serde_json::Value>,
  pub is_featured: bool,
  pub availability_status: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Car {
  pub fn display_name(&self) -> String {
    format!("{} {} {}", self.year, self.brand, self.model)
  }

  /// Builds a new row from validated input.
  pub fn from_input(input: CarInput) -> Result<Self> {
    let status = input.validate()?;
    let now = Utc::now();
    Ok(Self {
      id: Uuid::new_v4(),
      brand: input.brand.trim().to_string(),
      model: input.model.trim().to_string(),
      year: input.year,
      price: input.price,
      range_km: input.range_km,
      battery_capacity: input.battery_capacity,
      acceleration_0_100: input.acceleration_0_100,
      top_speed: input.top_speed,
      charging_time_hours: input.charging_time_hours,
      exterior_color: input.exterior_color,
      interior_color: input.interior_color,
      images: input.images,
      features: input.features,
      specifications: input.specifications,
      is_featured: input.is_featured,
      availability_status: status.as_str().to_string(),
      created_at: now,
      updated_at: now,
    })
  }

  /// Overwrites the editable fields, keeping id and creation time.
  pub fn apply(&mut self, input: CarInput) -> Result<()> {
    let mut replacement = Car::from_input(input)?;
    replacement.id = self.id;
    replacement.created_at = self.created_at;
    *self = replacement;
    Ok(())
  }
}

/// Create/update payload for the admin catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CarInput {
  pub brand: String,
  pub model: String,
  pub year: i32,
  pub price: i64,
  pub range_km: i32,
  #[serde(default)]
  pub battery_capacity: Option<f64>,
  #[serde(default)]
  pub acceleration_0_100: Option<f64>,
  #[serde(default)]
  pub top_speed: Option<i32>,
  #[serde(default)]
  pub charging_time_hours: Option<f64>,
  #[serde(default)]
  pub exterior_color: Option<String>,
  #[serde(default)]
  pub interior_color: Option<String>,
  #[serde(default)]
  pub images: Vec<String>,
  #[serde(default)]
  pub features: Vec<String>,
  #[serde(default)]
  pub specifications: Option<serde_json::Value>,
  #[serde(default)]
  pub is_featured: bool,
  #[serde(default)]
  pub availability_status: Option<String>,
}

impl CarInput {
  /// Checks required fields and returns the parsed availability status.
  pub fn validate(&self) -> Result<AvailabilityStatus> {
    if self.brand.trim().is_empty() || self.model.trim().is_empty() {
      return Err(AppError::Validation("Brand and model are required.".to_string()));
    }
    let max_year = Utc::now().year() + 2;
    if self.year < 1990 || self.year > max_year {
      return Err(AppError::Validation(format!("Year must be between 1990 and {}.", max_year)));
    }
    if self.price <= 0 {
      return Err(AppError::Validation("Price must be greater than zero.".to_string()));
    }
    if self.range_km <= 0 {
      return Err(AppError::Validation("Range must be greater than zero.".to_string()));
    }
    match self.availability_status.as_deref() {
      Some(raw) => raw.parse(),
      None => Ok(AvailabilityStatus::Available),
    }
  }
}

/// Query filters for the public catalog listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarFilter {
  pub brand: Option<String>,
  pub featured: Option<bool>,
  pub status: Option<String>,
  pub min_price: Option<i64>,
  pub max_price: Option<i64>,
  /// Case-insensitive match over brand and model.
  pub search: Option<String>,
}

impl CarFilter {
  pub fn matches(&self, car: &Car) -> bool {
    if let Some(brand) = &self.brand {
      if !car.brand.eq_ignore_ascii_case(brand.trim()) {
        return false;
      }
    }
    if let Some(featured) = self.featured {
      if car.is_featured != featured {
        return false;
      }
    }
    if let Some(status) = &self.status {
      if car.availability_status != status.trim() {
        return false;
      }
    }
    if self.min_price.is_some_and(|min| car.price < min) {
      return false;
    }
    if self.max_price.is_some_and(|max| car.price > max) {
      return false;
    }
    if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
      let needle = search.to_lowercase();
      let haystack = format!("{} {}", car.brand, car.model).to_lowercase();
      if !haystack.contains(&needle) {
        return false;
      }
    }
    true
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn sample_input(brand: &str, model: &str, price: i64) -> CarInput {
    CarInput {
      brand: brand.to_string(),
      model: model.to_string(),
      year: 2024,
      price,
      range_km: 450,
      battery_capacity: Some(75.0),
      acceleration_0_100: None,
      top_speed: None,
      charging_time_hours: None,
      exterior_color: None,
      interior_color: None,
      images: Vec::new(),
      features: vec!["Autopilot".to_string()],
      specifications: None,
      is_featured: false,
      availability_status: None,
    }
  }

  #[test]
  fn input_defaults_to_available() {
    let car = Car::from_input(sample_input("Tesla", "Model 3", 45_000_000)).unwrap();
    assert_eq!(car.availability_status, "available");
    assert_eq!(car.display_name(), "2024 Tesla Model 3");
  }

  #[test]
  fn input_rejects_unknown_status_and_bad_price() {
    let mut input = sample_input("BYD", "Seal", 30_000_000);
    input.availability_status = Some("discontinued".to_string());
    assert!(matches!(input.validate(), Err(AppError::Validation(_))));

    let free = sample_input("BYD", "Seal", 0);
    assert!(free.validate().is_err());
  }

  #[test]
  fn filter_matches_search_and_price_band() {
    let car = Car::from_input(sample_input("Hyundai", "Ioniq 5", 38_000_000)).unwrap();
    let filter = CarFilter {
      search: Some("ioniq".to_string()),
      min_price: Some(30_000_000),
      max_price: Some(40_000_000),
      ..Default::default()
    };
    assert!(filter.matches(&car));

    let too_cheap = CarFilter {
      max_price: Some(10_000_000),
      ..Default::default()
    };
    assert!(!too_cheap.matches(&car));
  }

  #[test]
  fn search_treats_like_metacharacters_literally() {
    let car = Car::from_input(sample_input("Kia", "EV6 GT_Line", 52_000_000)).unwrap();
    let search = |term: &str| CarFilter {
      search: Some(term.to_string()),
      ..Default::default()
    };
    assert!(search("gt_line").matches(&car));
    assert!(!search("%").matches(&car));
    assert!(!search("EV_").matches(&car));
  }
}
