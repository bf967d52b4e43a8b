// app/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

string_enum!(
  ReviewStatus {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
  }
);

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
  pub id: Uuid,
  pub car_id: Uuid,
  pub user_id: Uuid,
  pub rating: i16,
  pub title: String,
  pub comment: String,
  pub is_verified_purchase: bool,
  pub status: String,
  pub admin_notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub car_id: Uuid,
  pub user_id: Uuid,
  pub rating: i16,
  pub title: String,
  pub comment: String,
  pub is_verified_purchase: bool,
}

impl NewReview {
  pub fn into_review(self) -> Review {
    let now = Utc::now();
    Review {
      id: Uuid::new_v4(),
      car_id: self.car_id,
      user_id: self.user_id,
      rating: self.rating,
      title: self.title,
      comment: self.comment,
      is_verified_purchase: self.is_verified_purchase,
      status: ReviewStatus::Pending.as_str().to_string(),
      admin_notes: None,
      created_at: now,
      updated_at: now,
    }
  }
}

/// Mean rating rounded to one decimal, `None` when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
  if reviews.is_empty() {
    return None;
  }
  let total: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
  let mean = total as f64 / reviews.len() as f64;
  Some((mean * 10.0).round() / 10.0)
}
