// tests/api_tests.rs

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use chrono::{Duration, Utc};
use common::*;
use marketplace::models::{Role, SettingKey};
use marketplace::web::configure_app_routes;
use serde_json::{json, Value};

macro_rules! init_app {
  ($app:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($app.state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

#[actix_web::test]
async fn health_and_default_features() {
  let app = test_app();
  let service = init_app!(app);

  let resp = test::call_service(&service, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let features: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get().uri("/api/v1/site/features").to_request(),
  )
  .await;
  assert_eq!(features["enable_financing"], json!(false));
  assert_eq!(features["show_our_impact"], json!(true));
  assert_eq!(features["maintenance_mode"], json!(false));
}

#[actix_web::test]
async fn maintenance_mode_closes_the_storefront_except_for_admins() {
  let app = test_app();
  add_car(&app, "BYD", "Dolphin", 25_000_000).await;
  let (_, admin_token) = add_user(&app, "admin@example.com", Role::Admin).await;
  let (_, user_token) = add_user(&app, "user@example.com", Role::User).await;
  app.store.upsert_setting(SettingKey::MaintenanceMode, true, None).await.unwrap();
  let service = init_app!(app);

  let anon = test::call_service(&service, test::TestRequest::get().uri("/api/v1/cars").to_request()).await;
  assert_eq!(anon.status(), StatusCode::SERVICE_UNAVAILABLE);

  let user = test::call_service(
    &service,
    test::TestRequest::get().uri("/api/v1/cars").insert_header(bearer(&user_token)).to_request(),
  )
  .await;
  assert_eq!(user.status(), StatusCode::SERVICE_UNAVAILABLE);

  let admin: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get().uri("/api/v1/cars").insert_header(bearer(&admin_token)).to_request(),
  )
  .await;
  assert_eq!(admin["count"], json!(1));

  let features = test::call_service(&service, test::TestRequest::get().uri("/api/v1/site/features").to_request()).await;
  assert_eq!(features.status(), StatusCode::OK);
}

#[actix_web::test]
async fn financing_is_hidden_until_enabled() {
  let app = test_app();
  let service = init_app!(app);

  let hidden = test::call_service(&service, test::TestRequest::get().uri("/api/v1/financing/plans").to_request()).await;
  assert_eq!(hidden.status(), StatusCode::NOT_FOUND);

  app.store.upsert_setting(SettingKey::EnableFinancing, true, None).await.unwrap();
  let plans: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get().uri("/api/v1/financing/plans").to_request(),
  )
  .await;
  assert_eq!(plans["plans"].as_array().map(Vec::len), Some(3));

  let quote: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/financing/quote")
      .set_json(json!({ "tenure_months": 36, "vehicle_price": 10_000_000 }))
      .to_request(),
  )
  .await;
  assert_eq!(quote["down_payment"], json!(2_000_000));
  assert!(quote["monthly_payment"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn admin_routes_require_an_admin_session() {
  let app = test_app();
  let (_, user_token) = add_user(&app, "user@example.com", Role::User).await;
  let service = init_app!(app);

  let anon = test::call_service(&service, test::TestRequest::get().uri("/api/v1/admin/stats").to_request()).await;
  assert_eq!(anon.status(), StatusCode::UNAUTHORIZED);

  let user = test::call_service(
    &service,
    test::TestRequest::get().uri("/api/v1/admin/stats").insert_header(bearer(&user_token)).to_request(),
  )
  .await;
  assert_eq!(user.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn bulk_status_touches_exactly_the_selected_cars() {
  let app = test_app();
  let a = add_car(&app, "BYD", "Seal", 45_000_000).await;
  let b = add_car(&app, "BYD", "Atto 3", 38_000_000).await;
  let c = add_car(&app, "Tesla", "Model Y", 70_000_000).await;
  let (_, admin_token) = add_user(&app, "admin@example.com", Role::Admin).await;
  let service = init_app!(app);

  let body: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/admin/cars/bulk-status")
      .insert_header(bearer(&admin_token))
      .set_json(json!({ "car_ids": [a.id, b.id], "status": "reserved" }))
      .to_request(),
  )
  .await;
  assert_eq!(body["updated"], json!(2));

  for (id, expected) in [(a.id, "reserved"), (b.id, "reserved"), (c.id, "available")] {
    let car = app.store.get_car(id).await.unwrap().unwrap();
    assert_eq!(car.availability_status, expected);
  }

  let logs = app.store.list_audit_logs(10).await.unwrap();
  assert_eq!(logs[0].action, "bulk_status_update");

  let bad = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/admin/cars/bulk-status")
      .insert_header(bearer(&admin_token))
      .set_json(json!({ "car_ids": [a.id], "status": "teleported" }))
      .to_request(),
  )
  .await;
  assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn csv_export_lists_one_row_per_car() {
  let app = test_app();
  add_car(&app, "BYD", "Seal", 45_000_000).await;
  add_car(&app, "Mercedes-Benz", "EQS, 580", 150_000_000).await;
  let (_, admin_token) = add_user(&app, "admin@example.com", Role::Admin).await;
  let service = init_app!(app);

  let resp = test::call_service(
    &service,
    test::TestRequest::get()
      .uri("/api/v1/admin/cars/export")
      .insert_header(bearer(&admin_token))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::OK);
  let content_type = resp.headers().get("content-type").unwrap().to_str().unwrap().to_string();
  assert!(content_type.starts_with("text/csv"));

  let body = test::read_body(resp).await;
  let text = String::from_utf8(body.to_vec()).unwrap();
  let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
  assert_eq!(lines[0], "Brand,Model,Year,Price,Range (km),Status");
  assert_eq!(lines.len(), 3);
  assert!(lines.contains(&"Mercedes-Benz,\"EQS, 580\",2024,150000000,420,available"));
}

#[actix_web::test]
async fn purchase_then_verify_over_http() {
  let app = test_app();
  let car = add_car(&app, "Hyundai", "Ioniq 5", 55_000_000).await;
  let (_, token) = add_user(&app, "buyer@example.com", Role::User).await;
  let service = init_app!(app);

  let unauthenticated = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/orders")
      .set_json(json!({ "car_id": car.id, "delivery_address": "Ikeja" }))
      .to_request(),
  )
  .await;
  assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

  let delivery = (Utc::now().date_naive() + Duration::days(14)).to_string();
  let created: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header(bearer(&token))
      .set_json(json!({ "car_id": car.id, "delivery_address": "Ikeja GRA", "delivery_date": delivery }))
      .to_request(),
  )
  .await;
  assert_eq!(created["order"]["payment_status"], json!("pending"));
  let reference = created["reference"].as_str().unwrap().to_string();
  assert!(created["authorization_url"].as_str().unwrap().ends_with(&reference));

  let verified: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get()
      .uri(&format!("/api/v1/payments/verify?trxref={}", reference))
      .to_request(),
  )
  .await;
  assert_eq!(verified["status"], json!("success"));
  assert_eq!(verified["order"]["payment_status"], json!("paid"));
  assert_eq!(verified["order"]["status"], json!("confirmed"));

  let dashboard: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get().uri("/api/v1/dashboard").insert_header(bearer(&token)).to_request(),
  )
  .await;
  assert_eq!(dashboard["orders"].as_array().map(Vec::len), Some(1));

  let missing = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/payments/verify")
      .set_json(json!({}))
      .to_request(),
  )
  .await;
  assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn gateway_outage_answers_500_with_the_message() {
  let app = test_app();
  *app.gateway.fail_initialize.lock() = true;
  let car = add_car(&app, "Hyundai", "Kona", 35_000_000).await;
  let (_, token) = add_user(&app, "buyer@example.com", Role::User).await;
  let service = init_app!(app);

  let resp = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header(bearer(&token))
      .set_json(json!({ "car_id": car.id, "delivery_address": "Yaba" }))
      .to_request(),
  )
  .await;
  assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], json!("Payment provider error"));
  assert!(body["detail"].as_str().unwrap().contains("stubbed outage"));
}

#[actix_web::test]
async fn reviews_are_flagged_as_verified_purchases() {
  let app = test_app();
  let car = add_car(&app, "BYD", "Seal", 45_000_000).await;
  let (_, token) = add_user(&app, "buyer@example.com", Role::User).await;
  let service = init_app!(app);

  let created: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header(bearer(&token))
      .set_json(json!({ "car_id": car.id, "delivery_address": "Lekki" }))
      .to_request(),
  )
  .await;
  let reference = created["reference"].as_str().unwrap().to_string();
  let verify = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/payments/verify")
      .set_json(json!({ "reference": reference }))
      .to_request(),
  )
  .await;
  assert_eq!(verify.status(), StatusCode::OK);

  let bad_rating = test::call_service(
    &service,
    test::TestRequest::post()
      .uri(&format!("/api/v1/cars/{}/reviews", car.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "rating": 6, "title": "Wow", "comment": "Fast" }))
      .to_request(),
  )
  .await;
  assert_eq!(bad_rating.status(), StatusCode::BAD_REQUEST);

  let review: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri(&format!("/api/v1/cars/{}/reviews", car.id))
      .insert_header(bearer(&token))
      .set_json(json!({ "rating": 5, "title": "Wow", "comment": "Fast and silent" }))
      .to_request(),
  )
  .await;
  assert_eq!(review["review"]["is_verified_purchase"], json!(true));
  assert_eq!(review["review"]["status"], json!("pending"));

  let public: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get().uri(&format!("/api/v1/cars/{}/reviews", car.id)).to_request(),
  )
  .await;
  assert_eq!(public["count"], json!(0));
}

#[actix_web::test]
async fn only_super_admins_change_roles() {
  let app = test_app();
  let (target, _) = add_user(&app, "user@example.com", Role::User).await;
  let (_, admin_token) = add_user(&app, "admin@example.com", Role::Admin).await;
  let (_, super_token) = add_user(&app, "root@example.com", Role::SuperAdmin).await;
  let service = init_app!(app);
  let uri = format!("/api/v1/admin/users/{}/role", target.id);

  let denied = test::call_service(
    &service,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&admin_token))
      .set_json(json!({ "role": "admin" }))
      .to_request(),
  )
  .await;
  assert_eq!(denied.status(), StatusCode::FORBIDDEN);

  let promoted: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::put()
      .uri(&uri)
      .insert_header(bearer(&super_token))
      .set_json(json!({ "role": "admin" }))
      .to_request(),
  )
  .await;
  assert_eq!(promoted["role"], json!("admin"));
  assert!(promoted.get("password_hash").is_none());
}

#[actix_web::test]
async fn signup_signin_and_signout() {
  let app = test_app();
  let service = init_app!(app);

  let signup = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/auth/signup")
      .set_json(json!({ "email": "new@example.com", "password": "long enough", "full_name": "New Driver" }))
      .to_request(),
  )
  .await;
  assert_eq!(signup.status(), StatusCode::CREATED);

  let signin: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/auth/signin")
      .set_json(json!({ "email": "new@example.com", "password": "long enough" }))
      .to_request(),
  )
  .await;
  let token = signin["token"].as_str().unwrap().to_string();

  let me: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::get().uri("/api/v1/auth/me").insert_header(bearer(&token)).to_request(),
  )
  .await;
  assert_eq!(me["profile"]["email"], json!("new@example.com"));

  let signout = test::call_service(
    &service,
    test::TestRequest::post().uri("/api/v1/auth/signout").insert_header(bearer(&token)).to_request(),
  )
  .await;
  assert_eq!(signout.status(), StatusCode::NO_CONTENT);

  let after = test::call_service(
    &service,
    test::TestRequest::get().uri("/api/v1/auth/me").insert_header(bearer(&token)).to_request(),
  )
  .await;
  assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn forgot_password_over_http() {
  let app = test_app();
  let (_, session_token) = add_user(&app, "driver@example.com", Role::User).await;
  let service = init_app!(app);

  let mut messages = Vec::new();
  for email in ["driver@example.com", "ghost@example.com"] {
    let body: Value = test::call_and_read_body_json(
      &service,
      test::TestRequest::post()
        .uri("/api/v1/auth/password-reset")
        .set_json(json!({ "email": email }))
        .to_request(),
    )
    .await;
    messages.push(body["message"].clone());
  }
  assert_eq!(messages[0], messages[1]);
  assert_eq!(app.mailer.sent.lock().len(), 1);

  let token = app.mailer.last_reset_token().unwrap();
  let confirm = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/auth/password-reset/confirm")
      .set_json(json!({ "token": token, "new_password": "brand new secret" }))
      .to_request(),
  )
  .await;
  assert_eq!(confirm.status(), StatusCode::OK);

  let reused = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/auth/password-reset/confirm")
      .set_json(json!({ "token": token, "new_password": "brand new secret" }))
      .to_request(),
  )
  .await;
  assert_eq!(reused.status(), StatusCode::BAD_REQUEST);

  let me = test::call_service(
    &service,
    test::TestRequest::get().uri("/api/v1/auth/me").insert_header(bearer(&session_token)).to_request(),
  )
  .await;
  assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

  let signin = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/auth/signin")
      .set_json(json!({ "email": "driver@example.com", "password": "brand new secret" }))
      .to_request(),
  )
  .await;
  assert_eq!(signin.status(), StatusCode::OK);
}

#[actix_web::test]
async fn newsletter_and_cost_calculator() {
  let app = test_app();
  let service = init_app!(app);

  let bad = test::call_service(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/newsletter")
      .set_json(json!({ "email": "nope" }))
      .to_request(),
  )
  .await;
  assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

  let costs: Value = test::call_and_read_body_json(
    &service,
    test::TestRequest::post()
      .uri("/api/v1/cost-calculator")
      .set_json(json!({ "distance_km": 100.0 }))
      .to_request(),
  )
  .await;
  let savings = costs["savings"]["daily"].as_f64().unwrap();
  let petrol = costs["petrol"]["daily"].as_f64().unwrap();
  let ev = costs["ev"]["daily"].as_f64().unwrap();
  assert!((savings - (petrol - ev)).abs() < 1e-6);
  assert!((costs["petrol"]["yearly"].as_f64().unwrap() - petrol * 365.0).abs() < 1e-3);
}
