// carpluto-flow/src/lib.rs

//! Async step-flow engine.
//!
//! A [`Flow`] is an ordered list of named steps. Each step can carry
//! `before`, `on` and `after` handlers that receive the shared
//! [`FlowData`] context and decide whether the flow keeps going
//! ([`StepControl::Continue`]) or halts early ([`StepControl::Stop`]).
//!
//! Flows are registered in a [`FlowRegistry`] keyed by their context type,
//! so callers only need to build the context and hand it to
//! [`FlowRegistry::run`].

pub mod control;
pub mod data;
pub mod error;
pub mod flow;
pub mod registry;
pub mod step;

pub use crate::control::{FlowOutcome, StepControl};
pub use crate::data::FlowData;
pub use crate::error::{FlowError, FlowResult};
pub use crate::flow::{Flow, Handler};
pub use crate::registry::FlowRegistry;
pub use crate::step::{SkipCondition, StepDef};
