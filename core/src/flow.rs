// carpluto-flow/src/flow.rs

//! The `Flow<T, E>` definition: step list, handler registration and the
//! run loop.

use crate::control::{FlowOutcome, StepControl};
use crate::data::FlowData;
use crate::error::{FlowError, FlowResult};
use crate::step::StepDef;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error, info, info_span, instrument, Instrument};

/// A boxed async step handler over context `T` failing with `E`.
pub type Handler<T, E> =
  Box<dyn Fn(FlowData<T>) -> Pin<Box<dyn Future<Output = Result<StepControl, E>> + Send>> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn as_str(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

struct StepHandlers<T: Send + Sync + 'static, E> {
  before: Vec<Handler<T, E>>,
  on: Vec<Handler<T, E>>,
  after: Vec<Handler<T, E>>,
}

impl<T: Send + Sync + 'static, E> StepHandlers<T, E> {
  fn new() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }

  fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }

  fn phase_mut(&mut self, phase: Phase) -> &mut Vec<Handler<T, E>> {
    match phase {
      Phase::Before => &mut self.before,
      Phase::On => &mut self.on,
      Phase::After => &mut self.after,
    }
  }

  fn in_order(&self) -> [(Phase, &Vec<Handler<T, E>>); 3] {
    [
      (Phase::Before, &self.before),
      (Phase::On, &self.on),
      (Phase::After, &self.after),
    ]
  }
}

/// An ordered, named sequence of async steps over a shared context `T`.
///
/// `E` is the error every handler's failure is converted into. It must be
/// constructible from [`FlowError`] so engine failures (a required step
/// without handlers, for instance) travel through the same channel.
pub struct Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  name: String,
  steps: Vec<StepDef<T>>,
  handlers: HashMap<String, StepHandlers<T, E>>,
}

impl<T, E> Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new(name: impl Into<String>, steps: Vec<StepDef<T>>) -> Self {
    Self {
      name: name.into(),
      steps,
      handlers: HashMap::new(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  fn position(&self, step_name: &str) -> FlowResult<usize> {
    self
      .steps
      .iter()
      .position(|s| s.name == step_name)
      .ok_or_else(|| FlowError::StepNotFound {
        flow_name: self.name.clone(),
        step_name: step_name.to_string(),
      })
  }

  /// Adds a step right after `existing_step`.
  pub fn insert_after(&mut self, existing_step: &str, step: StepDef<T>) -> FlowResult<&mut Self> {
    let idx = self.position(existing_step)?;
    self.steps.insert(idx + 1, step);
    Ok(self)
  }

  /// Marks an existing step as skipped whenever `condition` holds.
  pub fn skip_if(
    &mut self,
    step_name: &str,
    condition: impl Fn(&FlowData<T>) -> bool + Send + Sync + 'static,
  ) -> FlowResult<&mut Self> {
    let idx = self.position(step_name)?;
    self.steps[idx].skip_if = Some(std::sync::Arc::new(condition));
    Ok(self)
  }

  fn register<F, HandlerErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + 'static,
  {
    self.position(step_name)?;
    let handler: Handler<T, E> = Box::new(move |data| {
      let fut = handler_fn(data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .handlers
      .entry(step_name.to_string())
      .or_insert_with(StepHandlers::new)
      .phase_mut(phase)
      .push(handler);
    Ok(self)
  }

  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + 'static,
  {
    self.register(Phase::Before, step_name, handler_fn)
  }

  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + 'static,
  {
    self.register(Phase::On, step_name, handler_fn)
  }

  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowData<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + 'static,
  {
    self.register(Phase::After, step_name, handler_fn)
  }

  /// Runs every step in order against `data`.
  ///
  /// Returns `Stopped` as soon as a handler asks to stop and the first
  /// handler error otherwise. Handlers of one step run `before`, `on`,
  /// `after`, each group in registration order.
  #[instrument(
    name = "Flow::run",
    skip_all,
    fields(flow = %self.name, context = %std::any::type_name::<T>(), steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, data: FlowData<T>) -> Result<FlowOutcome, E> {
    debug!("Flow run starting.");

    for (index, step) in self.steps.iter().enumerate() {
      let span = info_span!("flow_step", step = %step.name, index, optional = step.optional);

      if let Some(skip_if) = &step.skip_if {
        if skip_if(&data) {
          debug!(parent: &span, "Skip condition matched, step skipped.");
          continue;
        }
      }

      let Some(handlers) = self.handlers.get(&step.name).filter(|h| !h.is_empty()) else {
        if step.optional {
          debug!(parent: &span, "Optional step has no handlers, skipped.");
          continue;
        }
        error!(parent: &span, "Required step has no handlers.");
        return Err(E::from(FlowError::HandlerMissing {
          flow_name: self.name.clone(),
          step_name: step.name.clone(),
        }));
      };

      for (phase, phase_handlers) in handlers.in_order() {
        for handler in phase_handlers {
          match handler(data.clone()).instrument(span.clone()).await {
            Ok(StepControl::Continue) => {}
            Ok(StepControl::Stop) => {
              info!(parent: &span, phase = phase.as_str(), "Flow stopped by handler.");
              return Ok(FlowOutcome::Stopped);
            }
            Err(err) => {
              error!(parent: &span, phase = phase.as_str(), error = %err, "Step handler failed.");
              return Err(err);
            }
          }
        }
      }
    }

    debug!("Flow run completed.");
    Ok(FlowOutcome::Completed)
  }
}
