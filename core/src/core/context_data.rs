// orderflow/src/core/context_data.rs

//! Shared, lockable state threaded through every step of a workflow pipeline.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared ownership of a pipeline's working state behind a `parking_lot::RwLock`.
///
/// Each step handler receives a clone pointing at the same data. Guards are
/// blocking and `!Send`, so they MUST be dropped before any `.await`; the
/// compiler rejects a handler future that keeps one alive across a suspension.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  /// Acquires a read lock. Drop the guard before awaiting.
  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  /// Acquires a write lock. Drop the guard before awaiting.
  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Recovers the owned state once every handler clone has been dropped.
  ///
  /// Returns `None` while another clone is still alive.
  pub fn into_inner(self) -> Option<T> {
    Arc::try_unwrap(self.0).ok().map(RwLock::into_inner)
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn into_inner_requires_sole_owner() {
    let ctx = ContextData::new(vec![1, 2, 3]);
    let other = ctx.clone();
    other.write().push(4);

    let ctx = match ctx.into_inner() {
      Some(_) => panic!("a second clone is still alive"),
      None => other,
    };
    assert_eq!(ctx.into_inner(), Some(vec![1, 2, 3, 4]));
  }
}
