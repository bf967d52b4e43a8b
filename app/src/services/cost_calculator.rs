// app/src/services/cost_calculator.rs

//! Petrol vs EV running-cost comparison.

use crate::errors::{AppError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingSource {
  #[default]
  Grid,
  Solar,
}

/// Inputs; every field falls back to a typical Nigerian value.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CostInputs {
  /// Kilometres driven per day.
  pub distance_km: f64,
  /// ₦ per litre.
  pub petrol_price: f64,
  /// ₦ per kWh.
  pub grid_tariff: f64,
  /// ₦ per kWh.
  pub solar_tariff: f64,
  /// Litres per 100 km.
  pub car_efficiency: f64,
  /// kWh per 100 km.
  pub ev_efficiency: f64,
  pub charging: ChargingSource,
}

impl Default for CostInputs {
  fn default() -> Self {
    Self {
      distance_km: 50.0,
      petrol_price: 1037.66,
      grid_tariff: 209.5,
      solar_tariff: 45.75,
      car_efficiency: 8.0,
      ev_efficiency: 15.0,
      charging: ChargingSource::Grid,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodCosts {
  pub daily: f64,
  pub weekly: f64,
  pub monthly: f64,
  pub yearly: f64,
}

impl PeriodCosts {
  fn from_daily(daily: f64) -> Self {
    Self {
      daily,
      weekly: daily * 7.0,
      monthly: daily * 30.0,
      yearly: daily * 365.0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostComparison {
  pub petrol: PeriodCosts,
  pub ev: PeriodCosts,
  pub savings: PeriodCosts,
}

pub fn compare(inputs: &CostInputs) -> Result<CostComparison> {
  let fields = [
    inputs.distance_km,
    inputs.petrol_price,
    inputs.grid_tariff,
    inputs.solar_tariff,
    inputs.car_efficiency,
    inputs.ev_efficiency,
  ];
  if fields.iter().any(|v| !v.is_finite() || *v < 0.0) {
    return Err(AppError::Validation("Calculator inputs must be non-negative numbers.".to_string()));
  }

  let hundreds_of_km = inputs.distance_km / 100.0;
  let petrol_daily = hundreds_of_km * inputs.car_efficiency * inputs.petrol_price;
  let tariff = match inputs.charging {
    ChargingSource::Grid => inputs.grid_tariff,
    ChargingSource::Solar => inputs.solar_tariff,
  };
  let ev_daily = hundreds_of_km * inputs.ev_efficiency * tariff;

  Ok(CostComparison {
    petrol: PeriodCosts::from_daily(petrol_daily),
    ev: PeriodCosts::from_daily(ev_daily),
    savings: PeriodCosts::from_daily(petrol_daily - ev_daily),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
  }

  #[test]
  fn defaults_on_grid() {
    let result = compare(&CostInputs::default()).unwrap();
    // 0.5 * 8 * 1037.66 and 0.5 * 15 * 209.5
    assert!(close(result.petrol.daily, 4150.64));
    assert!(close(result.ev.daily, 1571.25));
    assert!(close(result.savings.daily, 2579.39));
    assert!(close(result.petrol.weekly, 4150.64 * 7.0));
    assert!(close(result.ev.monthly, 1571.25 * 30.0));
    assert!(close(result.savings.yearly, 2579.39 * 365.0));
  }

  #[test]
  fn solar_uses_solar_tariff() {
    let inputs = CostInputs {
      charging: ChargingSource::Solar,
      ..CostInputs::default()
    };
    let result = compare(&inputs).unwrap();
    assert!(close(result.ev.daily, 0.5 * 15.0 * 45.75));
  }

  #[test]
  fn negative_inputs_are_rejected() {
    let inputs = CostInputs {
      distance_km: -1.0,
      ..CostInputs::default()
    };
    assert!(compare(&inputs).is_err());
  }
}
