// app/src/store/mod.rs

//! Table access behind one trait so handlers and flows never see which
//! backend is in use.

use crate::config::{AppConfig, StoreBackend};
use crate::errors::{AppError, Result};
use crate::models::{
  AdminSetting, AuditLog, AvailabilityStatus, Car, CarFilter, ChargingStation, Dealership, Order, OrderStatus,
  PasswordReset, PaymentStatus, Profile, Review, ReviewStatus, Role, Session, SettingKey, TestDrive, TestDriveStatus,
};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StoreCounts {
  pub cars: i64,
  pub profiles: i64,
  pub orders: i64,
  pub test_drives: i64,
  pub charging_stations: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
  // --- cars ---
  /// Newest first.
  async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>>;
  async fn get_car(&self, id: Uuid) -> Result<Option<Car>>;
  async fn insert_car(&self, car: &Car) -> Result<Car>;
  async fn update_car(&self, car: &Car) -> Result<Option<Car>>;
  async fn delete_car(&self, id: Uuid) -> Result<bool>;
  /// Sets the availability of every listed car; returns the number of rows changed.
  async fn set_car_status(&self, ids: &[Uuid], status: AvailabilityStatus) -> Result<u64>;

  // --- orders ---
  async fn insert_order(&self, order: &Order) -> Result<Order>;
  async fn get_order(&self, id: Uuid) -> Result<Option<Order>>;
  async fn attach_gateway_reference(&self, order_id: Uuid, reference: &str) -> Result<Option<Order>>;
  /// Writes the settlement of a verified transaction onto the order carrying `reference`.
  async fn settle_order_by_reference(
    &self,
    reference: &str,
    payment_status: PaymentStatus,
    status: OrderStatus,
  ) -> Result<Option<Order>>;
  async fn set_order_state(
    &self,
    id: Uuid,
    status: Option<OrderStatus>,
    payment_status: Option<PaymentStatus>,
  ) -> Result<Option<Order>>;
  /// All orders when `user_id` is `None`, newest first.
  async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<Order>>;
  async fn has_paid_order(&self, user_id: Uuid, car_id: Uuid) -> Result<bool>;

  // --- test drives ---
  async fn insert_test_drive(&self, test_drive: &TestDrive) -> Result<TestDrive>;
  async fn list_test_drives(&self, user_id: Option<Uuid>) -> Result<Vec<TestDrive>>;
  async fn set_test_drive_status(
    &self,
    id: Uuid,
    status: TestDriveStatus,
    admin_notes: Option<String>,
  ) -> Result<Option<TestDrive>>;

  // --- reviews ---
  async fn insert_review(&self, review: &Review) -> Result<Review>;
  async fn list_reviews(&self, car_id: Option<Uuid>, status: Option<ReviewStatus>) -> Result<Vec<Review>>;
  async fn moderate_review(
    &self,
    id: Uuid,
    status: ReviewStatus,
    admin_notes: Option<String>,
  ) -> Result<Option<Review>>;

  // --- profiles & sessions ---
  async fn insert_profile(&self, profile: &Profile) -> Result<Profile>;
  async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>>;
  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>>;
  async fn list_profiles(&self) -> Result<Vec<Profile>>;
  async fn set_profile_role(&self, id: Uuid, role: Role) -> Result<Option<Profile>>;
  async fn set_profile_password(&self, id: Uuid, password_hash: &str) -> Result<Option<Profile>>;
  async fn insert_session(&self, session: &Session) -> Result<()>;
  async fn find_session(&self, token: &str) -> Result<Option<Session>>;
  async fn delete_session(&self, token: &str) -> Result<bool>;
  /// Signs the profile out everywhere; returns how many sessions went.
  async fn delete_sessions_for_profile(&self, profile_id: Uuid) -> Result<u64>;

  // --- password resets ---
  /// Stores `reset`, discarding any unused grant the profile already had.
  async fn replace_password_reset(&self, reset: &PasswordReset) -> Result<()>;
  /// Marks the grant used if it is still redeemable and returns it.
  async fn consume_password_reset(&self, token_hash: &str) -> Result<Option<PasswordReset>>;

  // --- settings ---
  async fn list_settings(&self) -> Result<Vec<AdminSetting>>;
  async fn upsert_setting(&self, key: SettingKey, value: bool, description: Option<String>) -> Result<AdminSetting>;

  // --- locations ---
  async fn list_stations(&self) -> Result<Vec<ChargingStation>>;
  async fn insert_station(&self, station: &ChargingStation) -> Result<ChargingStation>;
  async fn list_dealerships(&self, active_only: bool) -> Result<Vec<Dealership>>;
  async fn get_dealership(&self, id: Uuid) -> Result<Option<Dealership>>;
  async fn insert_dealership(&self, dealership: &Dealership) -> Result<Dealership>;
  async fn update_dealership(&self, dealership: &Dealership) -> Result<Option<Dealership>>;
  async fn delete_dealership(&self, id: Uuid) -> Result<bool>;

  // --- audit ---
  async fn insert_audit_log(&self, entry: &AuditLog) -> Result<()>;
  /// Most recent first.
  async fn list_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>>;

  async fn counts(&self) -> Result<StoreCounts>;
}

/// Builds the configured backend, running migrations and seeding when asked.
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn Store>> {
  let store: Arc<dyn Store> = match config.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Arc::new(MemoryStore::with_default_settings())
    }
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres store".to_string()))?;
      let store = PgStore::connect(url).await?;
      if config.run_migrations {
        store.migrate().await?;
      }
      Arc::new(store)
    }
  };

  if config.seed_db {
    seed::seed_catalog(store.as_ref()).await?;
  }
  Ok(store)
}
