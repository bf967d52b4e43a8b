// app/src/errors.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use carpluto_flow::FlowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Site is under maintenance")]
  Maintenance,

  #[error("Payment Gateway Error: {0}")]
  Gateway(String),

  #[error("Email Delivery Error: {0}")]
  Email(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<reqwest::Error> for AppError {
  fn from(err: reqwest::Error) -> Self {
    AppError::Gateway(err.to_string())
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Maintenance => StatusCode::SERVICE_UNAVAILABLE,
      AppError::Gateway(_)
      | AppError::Email(_)
      | AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
      tracing::error!(application_error = %self, "Responding with server error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }

    let body = match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m) => json!({ "error": m }),
      AppError::Maintenance => json!({
        "error": "The site is currently under maintenance. Please check back soon.",
        "maintenance": true
      }),
      AppError::Gateway(m) => json!({ "error": "Payment provider error", "detail": m }),
      AppError::Email(m) => json!({ "error": "Email service error", "detail": m }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
      AppError::Sqlx(e) => json!({ "error": "Database operation failed", "detail": e.to_string() }),
      AppError::Workflow { source } => {
        tracing::error!(flow_error = ?source, "Workflow error details");
        json!({ "error": "Workflow processing error", "detail": source.to_string() })
      }
      AppError::Internal(m) => json!({ "error": "An internal error occurred", "detail": m }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_error_kind() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::Maintenance.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(AppError::Gateway("down".into()).status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let engine = AppError::from(FlowError::NotRegistered {
      type_name: "Ctx".into(),
    });
    assert_eq!(engine.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[actix_web::test]
  async fn declined_payments_surface_as_gateway_errors_with_detail() {
    let err = AppError::Gateway("Paystack verify failed: Transaction reference not found".into());
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Payment provider error");
    assert!(body["detail"].as_str().unwrap().contains("reference not found"));
  }
}
