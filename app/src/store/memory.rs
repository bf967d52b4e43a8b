// app/src/store/memory.rs

use super::{Store, StoreCounts};
use crate::errors::{AppError, Result};
use crate::models::{
  AdminSetting, AuditLog, AvailabilityStatus, Car, CarFilter, ChargingStation, Dealership, Order, OrderStatus,
  PasswordReset, PaymentStatus, Profile, Review, ReviewStatus, Role, Session, SettingKey, TestDrive, TestDriveStatus,
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
  cars: Vec<Car>,
  orders: Vec<Order>,
  test_drives: Vec<TestDrive>,
  reviews: Vec<Review>,
  profiles: Vec<Profile>,
  sessions: HashMap<String, Session>,
  password_resets: Vec<PasswordReset>,
  settings: Vec<AdminSetting>,
  stations: Vec<ChargingStation>,
  dealerships: Vec<Dealership>,
  audit_logs: Vec<AuditLog>,
}

/// Process-local store. Rows are kept in insertion order; listings that
/// are "newest first" walk them in reverse.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// An empty store carrying the same default settings rows as a fresh database.
  pub fn with_default_settings() -> Self {
    let store = Self::new();
    {
      let mut tables = store.tables.write();
      let now = Utc::now();
      for key in SettingKey::ALL {
        tables.settings.push(AdminSetting {
          id: Uuid::new_v4(),
          setting_key: key.as_str().to_string(),
          setting_value: matches!(key, SettingKey::ShowOurImpact),
          description: None,
          created_at: now,
          updated_at: now,
        });
      }
    }
    store
  }
}

fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
  rows.iter().rev().filter(|row| keep(row)).cloned().collect()
}

#[async_trait]
impl Store for MemoryStore {
  async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
    Ok(newest_first(&self.tables.read().cars, |car| filter.matches(car)))
  }

  async fn get_car(&self, id: Uuid) -> Result<Option<Car>> {
    Ok(self.tables.read().cars.iter().find(|c| c.id == id).cloned())
  }

  async fn insert_car(&self, car: &Car) -> Result<Car> {
    self.tables.write().cars.push(car.clone());
    Ok(car.clone())
  }

  async fn update_car(&self, car: &Car) -> Result<Option<Car>> {
    let mut tables = self.tables.write();
    let Some(existing) = tables.cars.iter_mut().find(|c| c.id == car.id) else {
      return Ok(None);
    };
    *existing = car.clone();
    existing.updated_at = Utc::now();
    Ok(Some(existing.clone()))
  }

  async fn delete_car(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.cars.len();
    tables.cars.retain(|c| c.id != id);
    Ok(tables.cars.len() != before)
  }

  async fn set_car_status(&self, ids: &[Uuid], status: AvailabilityStatus) -> Result<u64> {
    let mut tables = self.tables.write();
    let now = Utc::now();
    let mut changed = 0;
    for car in tables.cars.iter_mut().filter(|c| ids.contains(&c.id)) {
      car.availability_status = status.as_str().to_string();
      car.updated_at = now;
      changed += 1;
    }
    Ok(changed)
  }

  async fn insert_order(&self, order: &Order) -> Result<Order> {
    let mut tables = self.tables.write();
    if tables.orders.iter().any(|o| o.order_number == order.order_number) {
      return Err(AppError::Validation(format!(
        "Order number {} already exists.",
        order.order_number
      )));
    }
    tables.orders.push(order.clone());
    Ok(order.clone())
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn attach_gateway_reference(&self, order_id: Uuid, reference: &str) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let Some(order) = tables.orders.iter_mut().find(|o| o.id == order_id) else {
      return Ok(None);
    };
    order.paystack_reference = Some(reference.to_string());
    order.updated_at = Utc::now();
    Ok(Some(order.clone()))
  }

  async fn settle_order_by_reference(
    &self,
    reference: &str,
    payment_status: PaymentStatus,
    status: OrderStatus,
  ) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let now = Utc::now();
    let mut settled = None;
    for order in tables
      .orders
      .iter_mut()
      .filter(|o| match o.paystack_reference.as_deref() {
        Some(attached) => attached == reference,
        None => o.order_number == reference,
      })
    {
      order.payment_status = payment_status.as_str().to_string();
      order.status = status.as_str().to_string();
      order.updated_at = now;
      settled.get_or_insert_with(|| order.clone());
    }
    Ok(settled)
  }

  async fn set_order_state(
    &self,
    id: Uuid,
    status: Option<OrderStatus>,
    payment_status: Option<PaymentStatus>,
  ) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) else {
      return Ok(None);
    };
    if let Some(status) = status {
      order.status = status.as_str().to_string();
    }
    if let Some(payment_status) = payment_status {
      order.payment_status = payment_status.as_str().to_string();
    }
    order.updated_at = Utc::now();
    Ok(Some(order.clone()))
  }

  async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<Order>> {
    Ok(newest_first(&self.tables.read().orders, |o| {
      user_id.is_none() || o.user_id == user_id
    }))
  }

  async fn has_paid_order(&self, user_id: Uuid, car_id: Uuid) -> Result<bool> {
    Ok(self.tables.read().orders.iter().any(|o| {
      o.user_id == Some(user_id) && o.car_id == Some(car_id) && o.payment_status == PaymentStatus::Paid.as_str()
    }))
  }

  async fn insert_test_drive(&self, test_drive: &TestDrive) -> Result<TestDrive> {
    self.tables.write().test_drives.push(test_drive.clone());
    Ok(test_drive.clone())
  }

  async fn list_test_drives(&self, user_id: Option<Uuid>) -> Result<Vec<TestDrive>> {
    Ok(newest_first(&self.tables.read().test_drives, |t| {
      user_id.is_none() || t.user_id == user_id
    }))
  }

  async fn set_test_drive_status(
    &self,
    id: Uuid,
    status: TestDriveStatus,
    admin_notes: Option<String>,
  ) -> Result<Option<TestDrive>> {
    let mut tables = self.tables.write();
    let Some(row) = tables.test_drives.iter_mut().find(|t| t.id == id) else {
      return Ok(None);
    };
    row.status = status.as_str().to_string();
    if admin_notes.is_some() {
      row.admin_notes = admin_notes;
    }
    row.updated_at = Utc::now();
    Ok(Some(row.clone()))
  }

  async fn insert_review(&self, review: &Review) -> Result<Review> {
    self.tables.write().reviews.push(review.clone());
    Ok(review.clone())
  }

  async fn list_reviews(&self, car_id: Option<Uuid>, status: Option<ReviewStatus>) -> Result<Vec<Review>> {
    Ok(newest_first(&self.tables.read().reviews, |r| {
      car_id.map_or(true, |id| r.car_id == id) && status.map_or(true, |s| r.status == s.as_str())
    }))
  }

  async fn moderate_review(
    &self,
    id: Uuid,
    status: ReviewStatus,
    admin_notes: Option<String>,
  ) -> Result<Option<Review>> {
    let mut tables = self.tables.write();
    let Some(review) = tables.reviews.iter_mut().find(|r| r.id == id) else {
      return Ok(None);
    };
    review.status = status.as_str().to_string();
    review.admin_notes = admin_notes;
    review.updated_at = Utc::now();
    Ok(Some(review.clone()))
  }

  async fn insert_profile(&self, profile: &Profile) -> Result<Profile> {
    let mut tables = self.tables.write();
    if tables.profiles.iter().any(|p| p.email.eq_ignore_ascii_case(&profile.email)) {
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    tables.profiles.push(profile.clone());
    Ok(profile.clone())
  }

  async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
    Ok(
      self
        .tables
        .read()
        .profiles
        .iter()
        .find(|p| p.email.eq_ignore_ascii_case(email))
        .cloned(),
    )
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    Ok(self.tables.read().profiles.iter().find(|p| p.id == id).cloned())
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    Ok(newest_first(&self.tables.read().profiles, |_| true))
  }

  async fn set_profile_role(&self, id: Uuid, role: Role) -> Result<Option<Profile>> {
    let mut tables = self.tables.write();
    let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    profile.role = role.as_str().to_string();
    profile.updated_at = Utc::now();
    Ok(Some(profile.clone()))
  }

  async fn set_profile_password(&self, id: Uuid, password_hash: &str) -> Result<Option<Profile>> {
    let mut tables = self.tables.write();
    let Some(profile) = tables.profiles.iter_mut().find(|p| p.id == id) else {
      return Ok(None);
    };
    profile.password_hash = password_hash.to_string();
    profile.updated_at = Utc::now();
    Ok(Some(profile.clone()))
  }

  async fn insert_session(&self, session: &Session) -> Result<()> {
    self.tables.write().sessions.insert(session.token.clone(), session.clone());
    Ok(())
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    Ok(self.tables.read().sessions.get(token).cloned())
  }

  async fn delete_session(&self, token: &str) -> Result<bool> {
    Ok(self.tables.write().sessions.remove(token).is_some())
  }

  async fn delete_sessions_for_profile(&self, profile_id: Uuid) -> Result<u64> {
    let mut tables = self.tables.write();
    let before = tables.sessions.len();
    tables.sessions.retain(|_, s| s.profile_id != profile_id);
    Ok((before - tables.sessions.len()) as u64)
  }

  async fn replace_password_reset(&self, reset: &PasswordReset) -> Result<()> {
    let mut tables = self.tables.write();
    tables
      .password_resets
      .retain(|r| !(r.profile_id == reset.profile_id && r.used_at.is_none()));
    tables.password_resets.push(reset.clone());
    Ok(())
  }

  async fn consume_password_reset(&self, token_hash: &str) -> Result<Option<PasswordReset>> {
    let now = Utc::now();
    let mut tables = self.tables.write();
    let Some(reset) = tables
      .password_resets
      .iter_mut()
      .find(|r| r.token_hash == token_hash && r.is_redeemable(now))
    else {
      return Ok(None);
    };
    reset.used_at = Some(now);
    Ok(Some(reset.clone()))
  }

  async fn list_settings(&self) -> Result<Vec<AdminSetting>> {
    let mut settings = self.tables.read().settings.clone();
    settings.sort_by(|a, b| a.setting_key.cmp(&b.setting_key));
    Ok(settings)
  }

  async fn upsert_setting(&self, key: SettingKey, value: bool, description: Option<String>) -> Result<AdminSetting> {
    let mut tables = self.tables.write();
    let now = Utc::now();
    if let Some(existing) = tables.settings.iter_mut().find(|s| s.setting_key == key.as_str()) {
      existing.setting_value = value;
      if description.is_some() {
        existing.description = description;
      }
      existing.updated_at = now;
      return Ok(existing.clone());
    }
    let setting = AdminSetting {
      id: Uuid::new_v4(),
      setting_key: key.as_str().to_string(),
      setting_value: value,
      description,
      created_at: now,
      updated_at: now,
    };
    tables.settings.push(setting.clone());
    Ok(setting)
  }

  async fn list_stations(&self) -> Result<Vec<ChargingStation>> {
    let mut stations = self.tables.read().stations.clone();
    stations.sort_by(|a, b| (&a.state, &a.city, &a.name).cmp(&(&b.state, &b.city, &b.name)));
    Ok(stations)
  }

  async fn insert_station(&self, station: &ChargingStation) -> Result<ChargingStation> {
    self.tables.write().stations.push(station.clone());
    Ok(station.clone())
  }

  async fn list_dealerships(&self, active_only: bool) -> Result<Vec<Dealership>> {
    let mut rows: Vec<Dealership> = self
      .tables
      .read()
      .dealerships
      .iter()
      .filter(|d| !active_only || d.is_active)
      .cloned()
      .collect();
    rows.sort_by(|a, b| (&a.state, &a.city, &a.name).cmp(&(&b.state, &b.city, &b.name)));
    Ok(rows)
  }

  async fn get_dealership(&self, id: Uuid) -> Result<Option<Dealership>> {
    Ok(self.tables.read().dealerships.iter().find(|d| d.id == id).cloned())
  }

  async fn insert_dealership(&self, dealership: &Dealership) -> Result<Dealership> {
    self.tables.write().dealerships.push(dealership.clone());
    Ok(dealership.clone())
  }

  async fn update_dealership(&self, dealership: &Dealership) -> Result<Option<Dealership>> {
    let mut tables = self.tables.write();
    let Some(existing) = tables.dealerships.iter_mut().find(|d| d.id == dealership.id) else {
      return Ok(None);
    };
    *existing = dealership.clone();
    existing.updated_at = Utc::now();
    Ok(Some(existing.clone()))
  }

  async fn delete_dealership(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.dealerships.len();
    tables.dealerships.retain(|d| d.id != id);
    Ok(tables.dealerships.len() != before)
  }

  async fn insert_audit_log(&self, entry: &AuditLog) -> Result<()> {
    self.tables.write().audit_logs.push(entry.clone());
    Ok(())
  }

  async fn list_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>> {
    let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
    Ok(self.tables.read().audit_logs.iter().rev().take(limit).cloned().collect())
  }

  async fn counts(&self) -> Result<StoreCounts> {
    let tables = self.tables.read();
    let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
    Ok(StoreCounts {
      cars: count(tables.cars.len()),
      profiles: count(tables.profiles.len()),
      orders: count(tables.orders.len()),
      test_drives: count(tables.test_drives.len()),
      charging_stations: count(tables.stations.len()),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::car::tests::sample_input;
  use crate::models::NewOrder;

  async fn seeded(n: usize) -> (MemoryStore, Vec<Uuid>) {
    let store = MemoryStore::new();
    let mut ids = Vec::new();
    for i in 0..n {
      let car = Car::from_input(sample_input("Tesla", &format!("Model {i}"), 40_000_000)).unwrap();
      ids.push(store.insert_car(&car).await.unwrap().id);
    }
    (store, ids)
  }

  #[tokio::test]
  async fn bulk_status_touches_exactly_the_selected_rows() {
    let (store, ids) = seeded(5).await;
    let selected = [ids[0], ids[2], ids[4]];

    let changed = store.set_car_status(&selected, AvailabilityStatus::Sold).await.unwrap();
    assert_eq!(changed, 3);

    for car in store.list_cars(&CarFilter::default()).await.unwrap() {
      let expected = if selected.contains(&car.id) { "sold" } else { "available" };
      assert_eq!(car.availability_status, expected, "car {}", car.model);
    }
  }

  #[tokio::test]
  async fn settlement_falls_back_to_order_number_without_gateway_reference() {
    let (store, ids) = seeded(1).await;
    let order = NewOrder {
      order_number: "EV-1761000000000-0A1F".to_string(),
      user_id: Uuid::new_v4(),
      car_id: ids[0],
      total_amount: 40_000_000,
      delivery_address: "Lekki".to_string(),
      delivery_date: None,
      notes: None,
    }
    .into_order();
    let order = store.insert_order(&order).await.unwrap();
    assert!(order.paystack_reference.is_none());

    let settled = store
      .settle_order_by_reference("EV-1761000000000-0A1F", PaymentStatus::Paid, OrderStatus::Confirmed)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(settled.id, order.id);
    assert_eq!(settled.payment_status, "paid");

    store.attach_gateway_reference(order.id, "T-other").await.unwrap();
    let missed = store
      .settle_order_by_reference("EV-1761000000000-0A1F", PaymentStatus::Failed, OrderStatus::Cancelled)
      .await
      .unwrap();
    assert!(missed.is_none());
  }

  #[tokio::test]
  async fn bulk_status_ignores_unknown_ids() {
    let (store, ids) = seeded(2).await;
    let changed = store
      .set_car_status(&[ids[1], Uuid::new_v4()], AvailabilityStatus::Reserved)
      .await
      .unwrap();
    assert_eq!(changed, 1);
  }

  #[tokio::test]
  async fn default_settings_resolve_to_safe_toggles() {
    let store = MemoryStore::with_default_settings();
    let settings = store.list_settings().await.unwrap();
    assert_eq!(settings.len(), SettingKey::ALL.len());

    let toggles = crate::models::FeatureToggles::from_settings(&settings);
    assert_eq!(toggles, crate::models::FeatureToggles::default());

    store.upsert_setting(SettingKey::MaintenanceMode, true, None).await.unwrap();
    let toggles = crate::models::FeatureToggles::from_settings(&store.list_settings().await.unwrap());
    assert!(toggles.maintenance_mode);
    assert_eq!(store.list_settings().await.unwrap().len(), SettingKey::ALL.len());
  }
}
