// carpluto-flow/src/step.rs

use crate::data::FlowData;
use std::sync::Arc;

/// Evaluated before a step runs; `true` skips the step entirely.
pub type SkipCondition<T> = Arc<dyn Fn(&FlowData<T>) -> bool + Send + Sync + 'static>;

/// A named step. Optional steps without handlers are skipped silently;
/// required steps without handlers fail the run.
pub struct StepDef<T: Send + Sync + 'static> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: Send + Sync + 'static> StepDef<T> {
  pub fn required(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: false,
      skip_if: None,
    }
  }

  pub fn optional(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      optional: true,
      skip_if: None,
    }
  }

  pub fn skip_when(mut self, condition: impl Fn(&FlowData<T>) -> bool + Send + Sync + 'static) -> Self {
    self.skip_if = Some(Arc::new(condition));
    self
  }
}

impl<T: Send + Sync + 'static> Clone for StepDef<T> {
  fn clone(&self) -> Self {
    Self {
      name: self.name.clone(),
      optional: self.optional,
      skip_if: self.skip_if.clone(),
    }
  }
}

impl<T: Send + Sync + 'static> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("has_skip_condition", &self.skip_if.is_some())
      .finish()
  }
}
