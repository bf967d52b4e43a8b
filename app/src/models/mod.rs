// app/src/models/mod.rs

//! Row types and the status vocabularies stored alongside them.
//!
//! Status columns are plain `TEXT`; the enums here validate what gets
//! written and are converted with `as_str` / `FromStr`.

/// Declares a string-backed status enum with `as_str`, `ALL`, `Display`
/// and a `FromStr` that rejects unknown values as a validation error.
macro_rules! string_enum {
  ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum $name {
      $($variant),+
    }

    impl $name {
      pub const ALL: &'static [$name] = &[$($name::$variant),+];

      pub fn as_str(self) -> &'static str {
        match self {
          $($name::$variant => $text),+
        }
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl std::str::FromStr for $name {
      type Err = crate::errors::AppError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
          $($text => Ok($name::$variant),)+
          other => Err(crate::errors::AppError::Validation(format!(
            "Unknown {} '{}'. Expected one of: {}",
            stringify!($name),
            other,
            [$($text),+].join(", ")
          ))),
        }
      }
    }
  };
}

pub mod audit;
pub mod car;
pub mod dealership;
pub mod order;
pub mod profile;
pub mod review;
pub mod setting;
pub mod station;
pub mod test_drive;

pub use audit::{AuditLog, NewAuditLog};
pub use car::{AvailabilityStatus, Car, CarFilter, CarInput};
pub use dealership::{Dealership, DealershipInput};
pub use order::{NewOrder, Order, OrderStatus, PaymentStatus};
pub use profile::{NewProfile, PasswordReset, Profile, Role, Session};
pub use review::{NewReview, Review, ReviewStatus};
pub use setting::{AdminSetting, FeatureToggles, SettingKey};
pub use station::{ChargingStation, StationInput};
pub use test_drive::{NewTestDrive, TestDrive, TestDriveStatus};
