// app/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{admin, auth, catalog, locations, orders, payments, site, test_drives, webhooks};

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.route("/health", web::get().to(site::health_check_handler)).service(
    web::scope("/api/v1")
      .route("/health", web::get().to(site::health_check_handler))
      // Site content
      .route("/site/features", web::get().to(site::features_handler))
      .route("/financing/plans", web::get().to(site::finance_plans_handler))
      .route("/financing/quote", web::post().to(site::finance_quote_handler))
      .route("/cost-calculator", web::post().to(site::cost_calculator_handler))
      .route("/newsletter", web::post().to(site::newsletter_handler))
      .route("/charging-stations", web::get().to(locations::list_stations_handler))
      .route("/dealerships", web::get().to(locations::list_dealerships_handler))
      // Accounts
      .service(
        web::scope("/auth")
          .route("/signup", web::post().to(auth::signup_handler))
          .route("/signin", web::post().to(auth::signin_handler))
          .route("/signout", web::post().to(auth::signout_handler))
          .route("/password-reset", web::post().to(auth::password_reset_request_handler))
          .route("/password-reset/confirm", web::post().to(auth::password_reset_confirm_handler))
          .route("/me", web::get().to(auth::me_handler)),
      )
      .route("/dashboard", web::get().to(orders::dashboard_handler))
      // Catalog
      .service(
        web::scope("/cars")
          .route("", web::get().to(catalog::list_cars_handler))
          .route("/{car_id}", web::get().to(catalog::get_car_handler))
          .route("/{car_id}/reviews", web::get().to(catalog::list_reviews_handler))
          .route("/{car_id}/reviews", web::post().to(catalog::submit_review_handler)),
      )
      // Commerce
      .route("/orders", web::post().to(orders::purchase_handler))
      .route("/orders/{order_id}", web::get().to(orders::get_order_handler))
      .service(
        web::scope("/payments")
          .route("/verify", web::get().to(payments::verify_payment_query_handler))
          .route("/verify", web::post().to(payments::verify_payment_body_handler)),
      )
      .route("/test-drives", web::post().to(test_drives::book_test_drive_handler))
      .route("/test-drives", web::get().to(test_drives::my_test_drives_handler))
      .service(web::scope("/webhooks").route("/paystack", web::post().to(webhooks::paystack_webhook_handler)))
      // Back-office
      .service(
        web::scope("/admin")
          .route("/stats", web::get().to(admin::stats_handler))
          .route("/cars", web::get().to(admin::list_cars_handler))
          .route("/cars", web::post().to(admin::create_car_handler))
          .route("/cars/export", web::get().to(admin::export_cars_handler))
          .route("/cars/bulk-status", web::post().to(admin::bulk_car_status_handler))
          .route("/cars/{car_id}", web::put().to(admin::update_car_handler))
          .route("/cars/{car_id}", web::delete().to(admin::delete_car_handler))
          .route("/orders", web::get().to(admin::list_orders_handler))
          .route("/orders/{order_id}/status", web::put().to(admin::update_order_status_handler))
          .route("/test-drives", web::get().to(admin::list_test_drives_handler))
          .route("/test-drives/{booking_id}/status", web::put().to(admin::update_test_drive_status_handler))
          .route("/reviews", web::get().to(admin::list_reviews_handler))
          .route("/reviews/{review_id}/moderate", web::put().to(admin::moderate_review_handler))
          .route("/settings", web::get().to(admin::list_settings_handler))
          .route("/settings/{key}", web::put().to(admin::upsert_setting_handler))
          .route("/charging-stations", web::post().to(admin::create_station_handler))
          .route("/dealerships", web::get().to(admin::list_dealerships_handler))
          .route("/dealerships", web::post().to(admin::create_dealership_handler))
          .route("/dealerships/{dealership_id}", web::put().to(admin::update_dealership_handler))
          .route("/dealerships/{dealership_id}", web::delete().to(admin::delete_dealership_handler))
          .route("/users", web::get().to(admin::list_users_handler))
          .route("/users/{profile_id}/role", web::put().to(admin::change_role_handler))
          .route("/audit-logs", web::get().to(admin::audit_logs_handler)),
      ),
  );
}
