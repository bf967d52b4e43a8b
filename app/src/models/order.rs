// app/src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

string_enum!(
  OrderStatus {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
  }
);

string_enum!(
  PaymentStatus {
    Pending => "pending",
    Paid => "paid",
    Failed => "failed",
    Refunded => "refunded",
  }
);

impl PaymentStatus {
  /// The `(payment_status, status)` pair written for a verified transaction.
  pub fn settlement(succeeded: bool) -> (PaymentStatus, OrderStatus) {
    if succeeded {
      (PaymentStatus::Paid, OrderStatus::Confirmed)
    } else {
      (PaymentStatus::Failed, OrderStatus::Cancelled)
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub user_id: Option<Uuid>,
  pub car_id: Option<Uuid>,
  /// Whole naira.
  pub total_amount: i64,
  pub status: String,
  pub payment_status: String,
  pub payment_method: Option<String>,
  pub paystack_reference: Option<String>,
  pub delivery_address: Option<String>,
  pub delivery_date: Option<NaiveDate>,
  pub notes: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A pending order about to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub order_number: String,
  pub user_id: Uuid,
  pub car_id: Uuid,
  pub total_amount: i64,
  pub delivery_address: String,
  pub delivery_date: Option<NaiveDate>,
  pub notes: Option<String>,
}

impl NewOrder {
  pub fn into_order(self) -> Order {
    let now = Utc::now();
    Order {
      id: Uuid::new_v4(),
      order_number: self.order_number,
      user_id: Some(self.user_id),
      car_id: Some(self.car_id),
      total_amount: self.total_amount,
      status: OrderStatus::Pending.as_str().to_string(),
      payment_status: PaymentStatus::Pending.as_str().to_string(),
      payment_method: Some("paystack".to_string()),
      paystack_reference: None,
      delivery_address: Some(self.delivery_address),
      delivery_date: self.delivery_date,
      notes: self.notes,
      created_at: now,
      updated_at: now,
    }
  }
}
