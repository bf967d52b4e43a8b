// app/src/main.rs

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use marketplace::config::{AppConfig, LogFormat};
use marketplace::state::AppState;
use marketplace::web::configure_app_routes;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();
  init_tracing(LogFormat::from_env());
  tracing::info!("Starting marketplace server...");

  let config = AppConfig::from_env().context("loading configuration")?;
  let bind_address = (config.server_host.clone(), config.server_port);

  let app_state = AppState::from_config(config)
    .await
    .context("initialising application state")?;
  tracing::info!(flows = app_state.flows.len(), "Application state ready.");

  tracing::info!("Binding server to {}:{}...", bind_address.0, bind_address.1);
  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(bind_address)?
  .run()
  .await?;

  tracing::info!("Server stopped.");
  Ok(())
}
