// app/src/services/mod.rs

//! Outbound integrations and pure business helpers used by flows and handlers.

pub mod audit;
pub mod auth_service;
pub mod catalog_export;
pub mod cost_calculator;
pub mod email_templates;
pub mod financing;
pub mod mailer;
pub mod payment_gateway;
