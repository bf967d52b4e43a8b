// app/src/web/handlers/admin.rs

//! Admin back-office. Every route takes an [`AdminUser`]; every mutation
//! writes an audit entry.

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::user_agent;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{
  AvailabilityStatus, Car, CarFilter, CarInput, DealershipInput, OrderStatus, PaymentStatus, ReviewStatus, Role,
  SettingKey, StationInput, TestDriveStatus,
};
use crate::services::audit::{self, AuditActor, AuditEntry};
use crate::services::catalog_export;
use crate::state::AppState;
use crate::web::extractors::AdminUser;

fn actor(admin: &AdminUser, req: &HttpRequest) -> AuditActor {
  AuditActor {
    admin_user_id: admin.0.id,
    user_agent: user_agent(req),
  }
}

fn parse_opt<T: std::str::FromStr<Err = AppError>>(raw: Option<&str>) -> AppResult<Option<T>> {
  raw.map(str::parse).transpose()
}

// --- stats ---

pub async fn stats_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
  let counts = app_state.store.counts().await?;
  Ok(HttpResponse::Ok().json(counts))
}

// --- cars ---

pub async fn list_cars_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  filter: web::Query<CarFilter>,
) -> AppResult<HttpResponse> {
  let cars = app_state.store.list_cars(&filter).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": cars.len(), "cars": cars })))
}

#[instrument(name = "admin::create_car", skip_all, fields(admin_id = %admin.0.id))]
pub async fn create_car_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  payload: web::Json<CarInput>,
) -> AppResult<HttpResponse> {
  let car = Car::from_input(payload.into_inner())?;
  let car = app_state.store.insert_car(&car).await?;
  info!(car_id = %car.id, "Vehicle created.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("create", "car", car.id).after(&car),
  )
  .await;
  Ok(HttpResponse::Created().json(car))
}

#[instrument(name = "admin::update_car", skip_all, fields(admin_id = %admin.0.id))]
pub async fn update_car_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  car_id: web::Path<Uuid>,
  payload: web::Json<CarInput>,
) -> AppResult<HttpResponse> {
  let car_id = car_id.into_inner();
  let before = app_state
    .store
    .get_car(car_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found.", car_id)))?;
  let mut car = before.clone();
  car.apply(payload.into_inner())?;

  let car = app_state
    .store
    .update_car(&car)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found.", car_id)))?;
  info!(%car_id, "Vehicle updated.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("update", "car", car_id).before(&before).after(&car),
  )
  .await;
  Ok(HttpResponse::Ok().json(car))
}

#[instrument(name = "admin::delete_car", skip_all, fields(admin_id = %admin.0.id))]
pub async fn delete_car_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  car_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
  let car_id = car_id.into_inner();
  let before = app_state.store.get_car(car_id).await?;
  if !app_state.store.delete_car(car_id).await? {
    return Err(AppError::NotFound(format!("Vehicle {} not found.", car_id)));
  }
  info!(%car_id, "Vehicle deleted.");
  let mut entry = AuditEntry::new("delete", "car", car_id);
  if let Some(before) = &before {
    entry = entry.before(before);
  }
  audit::record(app_state.store.as_ref(), &actor(&admin, &req), entry).await;
  Ok(HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusPayload {
  pub car_ids: Vec<Uuid>,
  pub status: String,
}

#[instrument(name = "admin::bulk_car_status", skip_all, fields(admin_id = %admin.0.id, selected = payload.car_ids.len()))]
pub async fn bulk_car_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  payload: web::Json<BulkStatusPayload>,
) -> AppResult<HttpResponse> {
  let payload = payload.into_inner();
  if payload.car_ids.is_empty() {
    return Err(AppError::Validation("Select at least one vehicle.".to_string()));
  }
  let status: AvailabilityStatus = payload.status.parse()?;

  let updated = app_state.store.set_car_status(&payload.car_ids, status).await?;
  info!(updated, status = %status, "Bulk availability update applied.");
  let mut entry = AuditEntry::new("bulk_status_update", "car", format!("{} vehicles", updated));
  entry = entry.after(&json!({ "car_ids": payload.car_ids, "availability_status": status }));
  audit::record(app_state.store.as_ref(), &actor(&admin, &req), entry).await;

  Ok(HttpResponse::Ok().json(json!({ "updated": updated, "status": status })))
}

#[instrument(name = "admin::export_cars", skip_all, fields(admin_id = %admin.0.id))]
pub async fn export_cars_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  filter: web::Query<CarFilter>,
) -> AppResult<HttpResponse> {
  let cars = app_state.store.list_cars(&filter).await?;
  let csv = catalog_export::cars_to_csv(&cars);
  let filename = format!("catalog-{}.csv", Utc::now().format("%Y-%m-%d"));
  info!(rows = cars.len(), %filename, "Catalog exported.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry {
      action: "export",
      resource_type: "car",
      resource_id: None,
      old_values: None,
      new_values: Some(json!({ "rows": cars.len() })),
    },
  )
  .await;

  Ok(
    HttpResponse::Ok()
      .content_type("text/csv; charset=utf-8")
      .insert_header(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(filename)],
      })
      .body(csv),
  )
}

// --- orders ---

pub async fn list_orders_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
  let orders = app_state.store.list_orders(None).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": orders.len(), "orders": orders })))
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusPayload {
  #[serde(default)]
  pub status: Option<String>,
  #[serde(default)]
  pub payment_status: Option<String>,
}

#[instrument(name = "admin::update_order_status", skip_all, fields(admin_id = %admin.0.id))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  order_id: web::Path<Uuid>,
  payload: web::Json<OrderStatusPayload>,
) -> AppResult<HttpResponse> {
  let order_id = order_id.into_inner();
  let status: Option<OrderStatus> = parse_opt(payload.status.as_deref())?;
  let payment_status: Option<PaymentStatus> = parse_opt(payload.payment_status.as_deref())?;
  if status.is_none() && payment_status.is_none() {
    return Err(AppError::Validation("Nothing to update.".to_string()));
  }

  let not_found = || AppError::NotFound(format!("Order {} not found.", order_id));
  let before = app_state.store.get_order(order_id).await?.ok_or_else(not_found)?;
  let order = app_state
    .store
    .set_order_state(order_id, status, payment_status)
    .await?
    .ok_or_else(not_found)?;
  info!(%order_id, status = %order.status, payment_status = %order.payment_status, "Order status updated.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("update_status", "order", order_id)
      .before(&json!({ "status": before.status, "payment_status": before.payment_status }))
      .after(&json!({ "status": order.status, "payment_status": order.payment_status })),
  )
  .await;
  Ok(HttpResponse::Ok().json(order))
}

// --- test drives ---

pub async fn list_test_drives_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
  let test_drives = app_state.store.list_test_drives(None).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": test_drives.len(), "test_drives": test_drives })))
}

#[derive(Debug, Deserialize)]
pub struct StatusWithNotesPayload {
  pub status: String,
  #[serde(default)]
  pub admin_notes: Option<String>,
}

#[instrument(name = "admin::update_test_drive_status", skip_all, fields(admin_id = %admin.0.id))]
pub async fn update_test_drive_status_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  booking_id: web::Path<Uuid>,
  payload: web::Json<StatusWithNotesPayload>,
) -> AppResult<HttpResponse> {
  let booking_id = booking_id.into_inner();
  let payload = payload.into_inner();
  let status: TestDriveStatus = payload.status.parse()?;

  let booking = app_state
    .store
    .set_test_drive_status(booking_id, status, payload.admin_notes)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Test drive {} not found.", booking_id)))?;
  info!(%booking_id, status = %status, "Test drive status updated.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("update_status", "test_drive", booking_id).after(&booking),
  )
  .await;
  Ok(HttpResponse::Ok().json(booking))
}

// --- reviews ---

#[derive(Debug, Deserialize)]
pub struct ReviewQuery {
  #[serde(default)]
  pub status: Option<String>,
}

pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  query: web::Query<ReviewQuery>,
) -> AppResult<HttpResponse> {
  let status: Option<ReviewStatus> = parse_opt(query.status.as_deref())?;
  let reviews = app_state.store.list_reviews(None, status).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": reviews.len(), "reviews": reviews })))
}

#[instrument(name = "admin::moderate_review", skip_all, fields(admin_id = %admin.0.id))]
pub async fn moderate_review_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  review_id: web::Path<Uuid>,
  payload: web::Json<StatusWithNotesPayload>,
) -> AppResult<HttpResponse> {
  let review_id = review_id.into_inner();
  let payload = payload.into_inner();
  let status: ReviewStatus = payload.status.parse()?;
  if status == ReviewStatus::Pending {
    return Err(AppError::Validation("Moderation must approve or reject.".to_string()));
  }

  let review = app_state
    .store
    .moderate_review(review_id, status, payload.admin_notes)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Review {} not found.", review_id)))?;
  info!(%review_id, status = %status, "Review moderated.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("moderate", "review", review_id).after(&review),
  )
  .await;
  Ok(HttpResponse::Ok().json(review))
}

// --- settings ---

pub async fn list_settings_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
  let settings = app_state.store.list_settings().await?;
  Ok(HttpResponse::Ok().json(json!({ "settings": settings })))
}

#[derive(Debug, Deserialize)]
pub struct SettingPayload {
  pub setting_value: bool,
  #[serde(default)]
  pub description: Option<String>,
}

#[instrument(name = "admin::upsert_setting", skip_all, fields(admin_id = %admin.0.id))]
pub async fn upsert_setting_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  key: web::Path<String>,
  payload: web::Json<SettingPayload>,
) -> AppResult<HttpResponse> {
  let key: SettingKey = key.parse()?;
  let payload = payload.into_inner();
  let setting = app_state
    .store
    .upsert_setting(key, payload.setting_value, payload.description)
    .await?;
  if key == SettingKey::MaintenanceMode && setting.setting_value {
    warn!("Maintenance mode switched on.");
  }
  info!(key = %key, value = setting.setting_value, "Setting saved.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("upsert", "admin_setting", key).after(&setting),
  )
  .await;
  Ok(HttpResponse::Ok().json(setting))
}

// --- locations ---

#[instrument(name = "admin::create_station", skip_all, fields(admin_id = %admin.0.id))]
pub async fn create_station_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  payload: web::Json<StationInput>,
) -> AppResult<HttpResponse> {
  let station = payload.into_inner().into_station()?;
  let station = app_state.store.insert_station(&station).await?;
  info!(station_id = %station.id, "Charging station created.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("create", "charging_station", station.id).after(&station),
  )
  .await;
  Ok(HttpResponse::Created().json(station))
}

pub async fn list_dealerships_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
  let dealerships = app_state.store.list_dealerships(false).await?;
  Ok(HttpResponse::Ok().json(json!({ "dealerships": dealerships })))
}

#[instrument(name = "admin::create_dealership", skip_all, fields(admin_id = %admin.0.id))]
pub async fn create_dealership_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  payload: web::Json<DealershipInput>,
) -> AppResult<HttpResponse> {
  let dealership = payload.into_inner().into_dealership()?;
  let dealership = app_state.store.insert_dealership(&dealership).await?;
  info!(dealership_id = %dealership.id, "Dealership created.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("create", "dealership", dealership.id).after(&dealership),
  )
  .await;
  Ok(HttpResponse::Created().json(dealership))
}

#[instrument(name = "admin::update_dealership", skip_all, fields(admin_id = %admin.0.id))]
pub async fn update_dealership_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  dealership_id: web::Path<Uuid>,
  payload: web::Json<DealershipInput>,
) -> AppResult<HttpResponse> {
  let dealership_id = dealership_id.into_inner();
  let not_found = || AppError::NotFound(format!("Dealership {} not found.", dealership_id));
  let before = app_state.store.get_dealership(dealership_id).await?.ok_or_else(not_found)?;
  let updated = payload.into_inner().apply_to(&before)?;
  let updated = app_state
    .store
    .update_dealership(&updated)
    .await?
    .ok_or_else(not_found)?;
  info!(%dealership_id, "Dealership updated.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("update", "dealership", dealership_id).before(&before).after(&updated),
  )
  .await;
  Ok(HttpResponse::Ok().json(updated))
}

#[instrument(name = "admin::delete_dealership", skip_all, fields(admin_id = %admin.0.id))]
pub async fn delete_dealership_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  dealership_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
  let dealership_id = dealership_id.into_inner();
  if !app_state.store.delete_dealership(dealership_id).await? {
    return Err(AppError::NotFound(format!("Dealership {} not found.", dealership_id)));
  }
  info!(%dealership_id, "Dealership deleted.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("delete", "dealership", dealership_id),
  )
  .await;
  Ok(HttpResponse::NoContent().finish())
}

// --- users ---

pub async fn list_users_handler(app_state: web::Data<AppState>, _admin: AdminUser) -> AppResult<HttpResponse> {
  let profiles = app_state.store.list_profiles().await?;
  Ok(HttpResponse::Ok().json(json!({ "count": profiles.len(), "users": profiles })))
}

#[derive(Debug, Deserialize)]
pub struct RolePayload {
  pub role: String,
}

#[instrument(name = "admin::change_role", skip_all, fields(admin_id = %admin.0.id))]
pub async fn change_role_handler(
  app_state: web::Data<AppState>,
  admin: AdminUser,
  req: HttpRequest,
  profile_id: web::Path<Uuid>,
  payload: web::Json<RolePayload>,
) -> AppResult<HttpResponse> {
  if admin.0.role() != Role::SuperAdmin {
    return Err(AppError::Forbidden("Only a super admin can change roles.".to_string()));
  }
  let profile_id = profile_id.into_inner();
  let role: Role = payload.role.parse()?;

  let not_found = || AppError::NotFound(format!("User {} not found.", profile_id));
  let before = app_state.store.get_profile(profile_id).await?.ok_or_else(not_found)?;
  let profile = app_state
    .store
    .set_profile_role(profile_id, role)
    .await?
    .ok_or_else(not_found)?;
  info!(%profile_id, role = %role, "Role changed.");
  audit::record(
    app_state.store.as_ref(),
    &actor(&admin, &req),
    AuditEntry::new("change_role", "profile", profile_id)
      .before(&json!({ "role": before.role }))
      .after(&json!({ "role": profile.role })),
  )
  .await;
  Ok(HttpResponse::Ok().json(profile))
}

// --- audit ---

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
  #[serde(default)]
  pub limit: Option<i64>,
}

pub async fn audit_logs_handler(
  app_state: web::Data<AppState>,
  _admin: AdminUser,
  query: web::Query<AuditQuery>,
) -> AppResult<HttpResponse> {
  let limit = query.limit.unwrap_or(100).clamp(1, 500);
  let logs = app_state.store.list_audit_logs(limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": logs.len(), "logs": logs })))
}
