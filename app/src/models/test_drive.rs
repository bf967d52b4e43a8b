// app/src/models/test_drive.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

string_enum!(
  TestDriveStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Completed => "completed",
    Cancelled => "cancelled",
  }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TestDrive {
  pub id: Uuid,
  pub user_id: Option<Uuid>,
  pub car_id: Option<Uuid>,
  pub preferred_date: NaiveDate,
  pub preferred_time: String,
  pub pickup_location: String,
  pub driver_license_number: String,
  pub notes: Option<String>,
  pub admin_notes: Option<String>,
  pub status: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTestDrive {
  pub user_id: Uuid,
  pub car_id: Uuid,
  pub preferred_date: NaiveDate,
  pub preferred_time: String,
  pub pickup_location: String,
  pub driver_license_number: String,
  pub notes: Option<String>,
}

impl NewTestDrive {
  pub fn into_test_drive(self) -> TestDrive {
    let now = Utc::now();
    TestDrive {
      id: Uuid::new_v4(),
      user_id: Some(self.user_id),
      car_id: Some(self.car_id),
      preferred_date: self.preferred_date,
      preferred_time: self.preferred_time,
      pickup_location: self.pickup_location,
      driver_license_number: self.driver_license_number,
      notes: self.notes,
      admin_notes: None,
      status: TestDriveStatus::Pending.as_str().to_string(),
      created_at: now,
      updated_at: now,
    }
  }
}
