// app/src/lib.rs

//! EV marketplace service: catalog, Paystack checkout and reconciliation,
//! test drives, accounts and the admin back-office.

pub mod config;
pub mod errors;
pub mod flows;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod web;
