// tests/common/mod.rs
#![allow(dead_code)]

use carpluto_flow::{FlowData, FlowError, StepControl};
use once_cell::sync::Lazy;
use std::future::{ready, Ready};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct ReservationContext {
  pub trail: Vec<String>,
  pub amount_kobo: i64,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("flow engine error: {0}")]
  Engine(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Engine(format!("{:?}", err))
  }
}

/// Appends `label` to the trail, stopping the flow if `stop_at` names it.
pub fn mark(label: &'static str) -> impl Fn(FlowData<ReservationContext>) -> Ready<Result<StepControl, TestError>> + Send + Sync + 'static {
  move |ctx: FlowData<ReservationContext>| {
    let mut guard = ctx.write();
    guard.trail.push(label.to_string());
    let control = if guard.stop_at.as_deref() == Some(label) {
      StepControl::Stop
    } else {
      StepControl::Continue
    };
    ready(Ok(control))
  }
}

pub fn fail(label: &'static str, message: &'static str) -> impl Fn(FlowData<ReservationContext>) -> Ready<Result<StepControl, TestError>> + Send + Sync + 'static {
  move |ctx: FlowData<ReservationContext>| {
    ctx.write().trail.push(label.to_string());
    ready(Err(TestError::Handler(message.to_string())))
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
