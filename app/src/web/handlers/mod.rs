// app/src/web/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod locations;
pub mod orders;
pub mod payments;
pub mod site;
pub mod test_drives;
pub mod webhooks;

use actix_web::HttpRequest;

/// `User-Agent` of the request, if it is valid text.
pub(crate) fn user_agent(req: &HttpRequest) -> Option<String> {
  req
    .headers()
    .get(actix_web::http::header::USER_AGENT)
    .and_then(|v| v.to_str().ok())
    .map(str::to_string)
}
