// carpluto-flow/src/error.rs
use thiserror::Error;

/// Failures raised by the engine itself, as opposed to the business
/// errors returned by step handlers.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step '{step_name}' is not defined in flow '{flow_name}'")]
  StepNotFound { flow_name: String, step_name: String },

  #[error("Required step '{step_name}' of flow '{flow_name}' has no handlers")]
  HandlerMissing { flow_name: String, step_name: String },

  #[error("No flow registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Flow context type mismatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
