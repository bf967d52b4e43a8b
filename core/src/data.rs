// carpluto-flow/src/data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared flow context handed to every step handler.
///
/// Cloning is cheap and every clone points at the same value. The guards
/// returned by [`read`](Self::read) and [`write`](Self::write) block, so
/// they must be dropped before the handler reaches an `.await`.
#[derive(Debug)]
pub struct FlowData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowData<T> {
  pub fn new(value: T) -> Self {
    FlowData(Arc::new(RwLock::new(value)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Runs `f` under the write lock and returns its result.
  pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
    let mut guard = self.0.write();
    f(&mut guard)
  }

  /// Copies a value out of the context under the read lock.
  pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
    let guard = self.0.read();
    f(&guard)
  }
}

impl<T: Send + Sync + Clone + 'static> FlowData<T> {
  pub fn snapshot(&self) -> T {
    self.0.read().clone()
  }
}

impl<T: Send + Sync + 'static> Clone for FlowData<T> {
  fn clone(&self) -> Self {
    FlowData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + Default + 'static> Default for FlowData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_share_the_same_value() {
    let data = FlowData::new(1_u32);
    let other = data.clone();
    other.update(|v| *v += 41);
    assert_eq!(data.snapshot(), 42);
    assert_eq!(data.with(|v| *v * 2), 84);
  }
}
