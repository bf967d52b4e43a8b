// app/src/store/postgres.rs

use super::{Store, StoreCounts};
use crate::errors::{AppError, Result};
use crate::models::{
  AdminSetting, AuditLog, AvailabilityStatus, Car, CarFilter, ChargingStation, Dealership, Order, OrderStatus,
  PasswordReset, PaymentStatus, Profile, Review, ReviewStatus, Role, Session, SettingKey, TestDrive, TestDriveStatus,
};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Successfully connected to the database.");
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;
    info!("Database migrations applied.");
    Ok(())
  }
}

#[async_trait]
impl Store for PgStore {
  #[instrument(name = "pg::list_cars", skip(self), err(Display))]
  async fn list_cars(&self, filter: &CarFilter) -> Result<Vec<Car>> {
    let search = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let cars = sqlx::query_as::<_, Car>(
      "SELECT * FROM cars
       WHERE ($1::text IS NULL OR lower(brand) = lower($1))
         AND ($2::bool IS NULL OR is_featured = $2)
         AND ($3::text IS NULL OR availability_status = $3)
         AND ($4::bigint IS NULL OR price >= $4)
         AND ($5::bigint IS NULL OR price <= $5)
         AND ($6::text IS NULL OR strpos(lower(brand || ' ' || model), lower($6)) > 0)
       ORDER BY created_at DESC",
    )
    .bind(filter.brand.as_deref().map(str::trim))
    .bind(filter.featured)
    .bind(filter.status.as_deref().map(str::trim))
    .bind(filter.min_price)
    .bind(filter.max_price)
    .bind(search)
    .fetch_all(&self.pool)
    .await?;
    Ok(cars)
  }

  async fn get_car(&self, id: Uuid) -> Result<Option<Car>> {
    let car = sqlx::query_as::<_, Car>("SELECT * FROM cars WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(car)
  }

  async fn insert_car(&self, car: &Car) -> Result<Car> {
    let inserted = sqlx::query_as::<_, Car>(
      "INSERT INTO cars (id, brand, model, year, price, range_km, battery_capacity, acceleration_0_100,
         top_speed, charging_time_hours, exterior_color, interior_color, images, features, specifications,
         is_featured, availability_status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
       RETURNING *",
    )
    .bind(car.id)
    .bind(&car.brand)
    .bind(&car.model)
    .bind(car.year)
    .bind(car.price)
    .bind(car.range_km)
    .bind(car.battery_capacity)
    .bind(car.acceleration_0_100)
    .bind(car.top_speed)
    .bind(car.charging_time_hours)
    .bind(&car.exterior_color)
    .bind(&car.interior_color)
    .bind(&car.images)
    .bind(&car.features)
    .bind(&car.specifications)
    .bind(car.is_featured)
    .bind(&car.availability_status)
    .bind(car.created_at)
    .bind(car.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn update_car(&self, car: &Car) -> Result<Option<Car>> {
    let updated = sqlx::query_as::<_, Car>(
      "UPDATE cars SET brand = $2, model = $3, year = $4, price = $5, range_km = $6, battery_capacity = $7,
         acceleration_0_100 = $8, top_speed = $9, charging_time_hours = $10, exterior_color = $11,
         interior_color = $12, images = $13, features = $14, specifications = $15, is_featured = $16,
         availability_status = $17, updated_at = now()
       WHERE id = $1
       RETURNING *",
    )
    .bind(car.id)
    .bind(&car.brand)
    .bind(&car.model)
    .bind(car.year)
    .bind(car.price)
    .bind(car.range_km)
    .bind(car.battery_capacity)
    .bind(car.acceleration_0_100)
    .bind(car.top_speed)
    .bind(car.charging_time_hours)
    .bind(&car.exterior_color)
    .bind(&car.interior_color)
    .bind(&car.images)
    .bind(&car.features)
    .bind(&car.specifications)
    .bind(car.is_featured)
    .bind(&car.availability_status)
    .fetch_optional(&self.pool)
    .await?;
    Ok(updated)
  }

  async fn delete_car(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cars WHERE id = $1").bind(id).execute(&self.pool).await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "pg::set_car_status", skip(self, ids), fields(count = ids.len()), err(Display))]
  async fn set_car_status(&self, ids: &[Uuid], status: AvailabilityStatus) -> Result<u64> {
    if ids.is_empty() {
      return Ok(0);
    }
    let result = sqlx::query("UPDATE cars SET availability_status = $1, updated_at = now() WHERE id = ANY($2)")
      .bind(status.as_str())
      .bind(ids)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn insert_order(&self, order: &Order) -> Result<Order> {
    let inserted = sqlx::query_as::<_, Order>(
      "INSERT INTO orders (id, order_number, user_id, car_id, total_amount, status, payment_status, payment_method,
         paystack_reference, delivery_address, delivery_date, notes, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
       RETURNING *",
    )
    .bind(order.id)
    .bind(&order.order_number)
    .bind(order.user_id)
    .bind(order.car_id)
    .bind(order.total_amount)
    .bind(&order.status)
    .bind(&order.payment_status)
    .bind(&order.payment_method)
    .bind(&order.paystack_reference)
    .bind(&order.delivery_address)
    .bind(order.delivery_date)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(order)
  }

  async fn attach_gateway_reference(&self, order_id: Uuid, reference: &str) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
      "UPDATE orders SET paystack_reference = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(order_id)
    .bind(reference)
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  #[instrument(name = "pg::settle_order_by_reference", skip(self), err(Display))]
  async fn settle_order_by_reference(
    &self,
    reference: &str,
    payment_status: PaymentStatus,
    status: OrderStatus,
  ) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
      "UPDATE orders SET payment_status = $2, status = $3, updated_at = now()
       WHERE paystack_reference = $1 OR (paystack_reference IS NULL AND order_number = $1)
       RETURNING *",
    )
    .bind(reference)
    .bind(payment_status.as_str())
    .bind(status.as_str())
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  async fn set_order_state(
    &self,
    id: Uuid,
    status: Option<OrderStatus>,
    payment_status: Option<PaymentStatus>,
  ) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(
      "UPDATE orders SET status = COALESCE($2, status), payment_status = COALESCE($3, payment_status),
         updated_at = now()
       WHERE id = $1
       RETURNING *",
    )
    .bind(id)
    .bind(status.map(OrderStatus::as_str))
    .bind(payment_status.map(PaymentStatus::as_str))
    .fetch_optional(&self.pool)
    .await?;
    Ok(order)
  }

  async fn list_orders(&self, user_id: Option<Uuid>) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
      "SELECT * FROM orders WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(orders)
  }

  async fn has_paid_order(&self, user_id: Uuid, car_id: Uuid) -> Result<bool> {
    let paid = sqlx::query_scalar::<_, bool>(
      "SELECT EXISTS(SELECT 1 FROM orders WHERE user_id = $1 AND car_id = $2 AND payment_status = 'paid')",
    )
    .bind(user_id)
    .bind(car_id)
    .fetch_one(&self.pool)
    .await?;
    Ok(paid)
  }

  async fn insert_test_drive(&self, test_drive: &TestDrive) -> Result<TestDrive> {
    let inserted = sqlx::query_as::<_, TestDrive>(
      "INSERT INTO test_drives (id, user_id, car_id, preferred_date, preferred_time, pickup_location,
         driver_license_number, notes, admin_notes, status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
       RETURNING *",
    )
    .bind(test_drive.id)
    .bind(test_drive.user_id)
    .bind(test_drive.car_id)
    .bind(test_drive.preferred_date)
    .bind(&test_drive.preferred_time)
    .bind(&test_drive.pickup_location)
    .bind(&test_drive.driver_license_number)
    .bind(&test_drive.notes)
    .bind(&test_drive.admin_notes)
    .bind(&test_drive.status)
    .bind(test_drive.created_at)
    .bind(test_drive.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn list_test_drives(&self, user_id: Option<Uuid>) -> Result<Vec<TestDrive>> {
    let rows = sqlx::query_as::<_, TestDrive>(
      "SELECT * FROM test_drives WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }

  async fn set_test_drive_status(
    &self,
    id: Uuid,
    status: TestDriveStatus,
    admin_notes: Option<String>,
  ) -> Result<Option<TestDrive>> {
    let row = sqlx::query_as::<_, TestDrive>(
      "UPDATE test_drives SET status = $2, admin_notes = COALESCE($3, admin_notes), updated_at = now()
       WHERE id = $1
       RETURNING *",
    )
    .bind(id)
    .bind(status.as_str())
    .bind(admin_notes)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row)
  }

  async fn insert_review(&self, review: &Review) -> Result<Review> {
    let inserted = sqlx::query_as::<_, Review>(
      "INSERT INTO reviews (id, car_id, user_id, rating, title, comment, is_verified_purchase, status,
         admin_notes, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
       RETURNING *",
    )
    .bind(review.id)
    .bind(review.car_id)
    .bind(review.user_id)
    .bind(review.rating)
    .bind(&review.title)
    .bind(&review.comment)
    .bind(review.is_verified_purchase)
    .bind(&review.status)
    .bind(&review.admin_notes)
    .bind(review.created_at)
    .bind(review.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn list_reviews(&self, car_id: Option<Uuid>, status: Option<ReviewStatus>) -> Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
      "SELECT * FROM reviews
       WHERE ($1::uuid IS NULL OR car_id = $1) AND ($2::text IS NULL OR status = $2)
       ORDER BY created_at DESC",
    )
    .bind(car_id)
    .bind(status.map(ReviewStatus::as_str))
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }

  async fn moderate_review(
    &self,
    id: Uuid,
    status: ReviewStatus,
    admin_notes: Option<String>,
  ) -> Result<Option<Review>> {
    let row = sqlx::query_as::<_, Review>(
      "UPDATE reviews SET status = $2, admin_notes = $3, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(status.as_str())
    .bind(admin_notes)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row)
  }

  async fn insert_profile(&self, profile: &Profile) -> Result<Profile> {
    let inserted = sqlx::query_as::<_, Profile>(
      "INSERT INTO profiles (id, email, password_hash, full_name, phone, role, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
       RETURNING *",
    )
    .bind(profile.id)
    .bind(&profile.email)
    .bind(&profile.password_hash)
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(&profile.role)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE lower(email) = lower($1)")
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(profile)
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(profile)
  }

  async fn list_profiles(&self) -> Result<Vec<Profile>> {
    let rows = sqlx::query_as::<_, Profile>("SELECT * FROM profiles ORDER BY created_at DESC")
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn set_profile_role(&self, id: Uuid, role: Role) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
      "UPDATE profiles SET role = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(role.as_str())
    .fetch_optional(&self.pool)
    .await?;
    Ok(profile)
  }

  async fn set_profile_password(&self, id: Uuid, password_hash: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
      "UPDATE profiles SET password_hash = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(password_hash)
    .fetch_optional(&self.pool)
    .await?;
    Ok(profile)
  }

  async fn insert_session(&self, session: &Session) -> Result<()> {
    sqlx::query("INSERT INTO sessions (token, profile_id, created_at, expires_at) VALUES ($1, $2, $3, $4)")
      .bind(&session.token)
      .bind(session.profile_id)
      .bind(session.created_at)
      .bind(session.expires_at)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn find_session(&self, token: &str) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE token = $1")
      .bind(token)
      .fetch_optional(&self.pool)
      .await?;
    Ok(session)
  }

  async fn delete_session(&self, token: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
      .bind(token)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn delete_sessions_for_profile(&self, profile_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE profile_id = $1")
      .bind(profile_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "pg::replace_password_reset", skip_all, fields(profile_id = %reset.profile_id), err(Display))]
  async fn replace_password_reset(&self, reset: &PasswordReset) -> Result<()> {
    let mut tx = self.pool.begin().await?;
    sqlx::query("DELETE FROM password_resets WHERE profile_id = $1 AND used_at IS NULL")
      .bind(reset.profile_id)
      .execute(&mut *tx)
      .await?;
    sqlx::query(
      "INSERT INTO password_resets (token_hash, profile_id, created_at, expires_at, used_at)
       VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(&reset.token_hash)
    .bind(reset.profile_id)
    .bind(reset.created_at)
    .bind(reset.expires_at)
    .bind(reset.used_at)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
  }

  async fn consume_password_reset(&self, token_hash: &str) -> Result<Option<PasswordReset>> {
    let reset = sqlx::query_as::<_, PasswordReset>(
      "UPDATE password_resets SET used_at = now()
       WHERE token_hash = $1 AND used_at IS NULL AND expires_at > now()
       RETURNING *",
    )
    .bind(token_hash)
    .fetch_optional(&self.pool)
    .await?;
    Ok(reset)
  }

  async fn list_settings(&self) -> Result<Vec<AdminSetting>> {
    let rows = sqlx::query_as::<_, AdminSetting>("SELECT * FROM admin_settings ORDER BY setting_key")
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn upsert_setting(&self, key: SettingKey, value: bool, description: Option<String>) -> Result<AdminSetting> {
    let row = sqlx::query_as::<_, AdminSetting>(
      "INSERT INTO admin_settings (id, setting_key, setting_value, description)
       VALUES ($1, $2, $3, $4)
       ON CONFLICT (setting_key) DO UPDATE
         SET setting_value = EXCLUDED.setting_value,
             description = COALESCE(EXCLUDED.description, admin_settings.description),
             updated_at = now()
       RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(key.as_str())
    .bind(value)
    .bind(description)
    .fetch_one(&self.pool)
    .await?;
    Ok(row)
  }

  async fn list_stations(&self) -> Result<Vec<ChargingStation>> {
    let rows = sqlx::query_as::<_, ChargingStation>("SELECT * FROM charging_stations ORDER BY state, city, name")
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn insert_station(&self, station: &ChargingStation) -> Result<ChargingStation> {
    let inserted = sqlx::query_as::<_, ChargingStation>(
      "INSERT INTO charging_stations (id, name, address, city, state, latitude, longitude, connector_types,
         amenities, power_output, pricing_per_kwh, operating_hours, status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
       RETURNING *",
    )
    .bind(station.id)
    .bind(&station.name)
    .bind(&station.address)
    .bind(&station.city)
    .bind(&station.state)
    .bind(station.latitude)
    .bind(station.longitude)
    .bind(&station.connector_types)
    .bind(&station.amenities)
    .bind(&station.power_output)
    .bind(station.pricing_per_kwh)
    .bind(&station.operating_hours)
    .bind(&station.status)
    .bind(station.created_at)
    .bind(station.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn list_dealerships(&self, active_only: bool) -> Result<Vec<Dealership>> {
    let rows = sqlx::query_as::<_, Dealership>(
      "SELECT * FROM dealership_locations WHERE (NOT $1 OR is_active) ORDER BY state, city, name",
    )
    .bind(active_only)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows)
  }

  async fn get_dealership(&self, id: Uuid) -> Result<Option<Dealership>> {
    let row = sqlx::query_as::<_, Dealership>("SELECT * FROM dealership_locations WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row)
  }

  async fn insert_dealership(&self, dealership: &Dealership) -> Result<Dealership> {
    let inserted = sqlx::query_as::<_, Dealership>(
      "INSERT INTO dealership_locations (id, name, address, city, state, phone, email, features, is_active,
         created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
       RETURNING *",
    )
    .bind(dealership.id)
    .bind(&dealership.name)
    .bind(&dealership.address)
    .bind(&dealership.city)
    .bind(&dealership.state)
    .bind(&dealership.phone)
    .bind(&dealership.email)
    .bind(&dealership.features)
    .bind(dealership.is_active)
    .bind(dealership.created_at)
    .bind(dealership.updated_at)
    .fetch_one(&self.pool)
    .await?;
    Ok(inserted)
  }

  async fn update_dealership(&self, dealership: &Dealership) -> Result<Option<Dealership>> {
    let row = sqlx::query_as::<_, Dealership>(
      "UPDATE dealership_locations SET name = $2, address = $3, city = $4, state = $5, phone = $6, email = $7,
         features = $8, is_active = $9, updated_at = now()
       WHERE id = $1
       RETURNING *",
    )
    .bind(dealership.id)
    .bind(&dealership.name)
    .bind(&dealership.address)
    .bind(&dealership.city)
    .bind(&dealership.state)
    .bind(&dealership.phone)
    .bind(&dealership.email)
    .bind(&dealership.features)
    .bind(dealership.is_active)
    .fetch_optional(&self.pool)
    .await?;
    Ok(row)
  }

  async fn delete_dealership(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM dealership_locations WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn insert_audit_log(&self, entry: &AuditLog) -> Result<()> {
    sqlx::query(
      "INSERT INTO audit_logs (id, admin_user_id, action, resource_type, resource_id, old_values, new_values,
         user_agent, created_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(entry.id)
    .bind(entry.admin_user_id)
    .bind(&entry.action)
    .bind(&entry.resource_type)
    .bind(&entry.resource_id)
    .bind(&entry.old_values)
    .bind(&entry.new_values)
    .bind(&entry.user_agent)
    .bind(entry.created_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  async fn list_audit_logs(&self, limit: i64) -> Result<Vec<AuditLog>> {
    let rows = sqlx::query_as::<_, AuditLog>("SELECT * FROM audit_logs ORDER BY created_at DESC LIMIT $1")
      .bind(limit)
      .fetch_all(&self.pool)
      .await?;
    Ok(rows)
  }

  async fn counts(&self) -> Result<StoreCounts> {
    let counts = sqlx::query_as::<_, StoreCounts>(
      "SELECT
         (SELECT COUNT(*) FROM cars) AS cars,
         (SELECT COUNT(*) FROM profiles) AS profiles,
         (SELECT COUNT(*) FROM orders) AS orders,
         (SELECT COUNT(*) FROM test_drives) AS test_drives,
         (SELECT COUNT(*) FROM charging_stations) AS charging_stations",
    )
    .fetch_one(&self.pool)
    .await?;
    Ok(counts)
  }
}
