// app/src/web/handlers/catalog.rs

//! Public vehicle catalog and customer reviews.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result as AppResult};
use crate::models::review::average_rating;
use crate::models::{CarFilter, NewReview, ReviewStatus};
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, SiteOpen};

#[instrument(name = "handler::list_cars", skip(app_state, _site))]
pub async fn list_cars_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
  filter: web::Query<CarFilter>,
) -> AppResult<HttpResponse> {
  let cars = app_state.store.list_cars(&filter).await?;
  info!(count = cars.len(), "Catalog listed.");
  Ok(HttpResponse::Ok().json(json!({ "count": cars.len(), "cars": cars })))
}

#[instrument(name = "handler::get_car", skip(app_state, _site))]
pub async fn get_car_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
  car_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
  let car_id = car_id.into_inner();
  let car = app_state
    .store
    .get_car(car_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found.", car_id)))?;
  Ok(HttpResponse::Ok().json(car))
}

#[instrument(name = "handler::list_reviews", skip(app_state, _site))]
pub async fn list_reviews_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
  car_id: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
  let reviews = app_state
    .store
    .list_reviews(Some(car_id.into_inner()), Some(ReviewStatus::Approved))
    .await?;
  Ok(HttpResponse::Ok().json(json!({
    "count": reviews.len(),
    "average_rating": average_rating(&reviews),
    "reviews": reviews,
  })))
}

#[derive(Debug, Deserialize)]
pub struct ReviewPayload {
  pub rating: i16,
  pub title: String,
  pub comment: String,
}

#[instrument(
  name = "handler::submit_review",
  skip(app_state, _site, user, payload),
  fields(profile_id = %user.profile.id, rating = payload.rating)
)]
pub async fn submit_review_handler(
  app_state: web::Data<AppState>,
  _site: SiteOpen,
  user: AuthenticatedUser,
  car_id: web::Path<Uuid>,
  payload: web::Json<ReviewPayload>,
) -> AppResult<HttpResponse> {
  let car_id = car_id.into_inner();
  let payload = payload.into_inner();

  if !(1..=5).contains(&payload.rating) {
    return Err(AppError::Validation("Rating must be between 1 and 5.".to_string()));
  }
  let title = payload.title.trim().to_string();
  let comment = payload.comment.trim().to_string();
  if title.is_empty() || comment.is_empty() {
    return Err(AppError::Validation("Review title and comment are required.".to_string()));
  }
  if app_state.store.get_car(car_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Vehicle {} not found.", car_id)));
  }

  let is_verified_purchase = app_state.store.has_paid_order(user.profile.id, car_id).await?;
  let review = NewReview {
    car_id,
    user_id: user.profile.id,
    rating: payload.rating,
    title,
    comment,
    is_verified_purchase,
  }
  .into_review();
  let review = app_state.store.insert_review(&review).await?;
  info!(review_id = %review.id, verified = is_verified_purchase, "Review submitted for moderation.");

  Ok(HttpResponse::Created().json(json!({
    "message": "Thanks! Your review will appear once it has been approved.",
    "review": review,
  })))
}
