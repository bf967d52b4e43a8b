// app/src/models/setting.rs

use crate::errors::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

string_enum!(
  /// Known `admin_settings.setting_key` values.
  SettingKey {
    EnableFinancing => "enable_financing",
    EnableChargingStations => "enable_charging_stations",
    EnableEvSupport => "enable_ev_support",
    ShowOurImpact => "show_our_impact",
    EnableWatermark => "enable_watermark",
    MaintenanceMode => "maintenance_mode",
  }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSetting {
  pub id: Uuid,
  pub setting_key: String,
  pub setting_value: bool,
  pub description: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Resolved visibility of the optional storefront sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureToggles {
  pub enable_financing: bool,
  pub enable_charging_stations: bool,
  pub enable_ev_support: bool,
  pub show_our_impact: bool,
  pub enable_watermark: bool,
  pub maintenance_mode: bool,
}

impl Default for FeatureToggles {
  /// The safe values: everything optional hidden, impact shown, site open.
  fn default() -> Self {
    Self {
      enable_financing: false,
      enable_charging_stations: false,
      enable_ev_support: false,
      show_our_impact: true,
      enable_watermark: false,
      maintenance_mode: false,
    }
  }
}

impl FeatureToggles {
  /// Overlays stored rows on the defaults. Unknown keys are ignored.
  pub fn from_settings(settings: &[AdminSetting]) -> Self {
    let mut toggles = Self::default();
    for setting in settings {
      let Ok(key) = setting.setting_key.parse::<SettingKey>() else {
        continue;
      };
      let value = setting.setting_value;
      match key {
        SettingKey::EnableFinancing => toggles.enable_financing = value,
        SettingKey::EnableChargingStations => toggles.enable_charging_stations = value,
        SettingKey::EnableEvSupport => toggles.enable_ev_support = value,
        SettingKey::ShowOurImpact => toggles.show_our_impact = value,
        SettingKey::EnableWatermark => toggles.enable_watermark = value,
        SettingKey::MaintenanceMode => toggles.maintenance_mode = value,
      }
    }
    toggles
  }

  /// Resolves a settings read, falling back to the defaults when it failed.
  pub fn from_lookup(lookup: Result<Vec<AdminSetting>>) -> Self {
    match lookup {
      Ok(settings) => Self::from_settings(&settings),
      Err(e) => {
        tracing::warn!(error = %e, "Settings read failed, using default feature toggles.");
        Self::default()
      }
    }
  }
}
