// carpluto-flow/src/registry.rs

//! `FlowRegistry<E>`: flows keyed by the type of context they run on.

use crate::control::FlowOutcome;
use crate::data::FlowData;
use crate::error::FlowError;
use crate::flow::Flow;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

#[async_trait]
trait ErasedFlow<E>: Send + Sync
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str;

  /// `data` must hold a `FlowData<T>` for the flow's own `T`.
  async fn run_erased(&self, data: Box<dyn Any + Send>) -> Result<FlowOutcome, E>;
}

#[async_trait]
impl<T, E> ErasedFlow<E> for Flow<T, E>
where
  T: Send + Sync + 'static,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn name(&self) -> &str {
    Flow::name(self)
  }

  async fn run_erased(&self, data: Box<dyn Any + Send>) -> Result<FlowOutcome, E> {
    let data = data.downcast::<FlowData<T>>().map_err(|_| {
      E::from(FlowError::TypeMismatch {
        expected_type: std::any::type_name::<FlowData<T>>().to_string(),
      })
    })?;
    self.run(*data).await
  }
}

/// Holds one flow per context type. Registering a second flow for the same
/// type replaces the first.
pub struct FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: RwLock<HashMap<TypeId, Arc<dyn ErasedFlow<E>>>>,
}

impl<E> FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: RwLock::new(HashMap::new()),
    }
  }

  pub fn register<T>(&self, flow: Flow<T, E>)
  where
    T: Send + Sync + 'static,
  {
    debug!(flow = flow.name(), context = %std::any::type_name::<T>(), "Registering flow.");
    self.flows.write().insert(TypeId::of::<T>(), Arc::new(flow));
  }

  pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
    self.flows.read().contains_key(&TypeId::of::<T>())
  }

  pub fn len(&self) -> usize {
    self.flows.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.flows.read().is_empty()
  }

  /// Runs the flow registered for `T` against `data`.
  pub async fn run<T>(&self, data: FlowData<T>) -> Result<FlowOutcome, E>
  where
    T: Send + Sync + 'static,
  {
    let registered = self.flows.read().get(&TypeId::of::<T>()).cloned();
    let Some(flow) = registered else {
      let type_name = std::any::type_name::<T>();
      error!(context = %type_name, "No flow registered for context type.");
      return Err(E::from(FlowError::NotRegistered {
        type_name: type_name.to_string(),
      }));
    };

    debug!(flow = flow.name(), "Dispatching flow.");
    flow.run_erased(Box::new(data)).await
  }
}

impl<E> Default for FlowRegistry<E>
where
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
