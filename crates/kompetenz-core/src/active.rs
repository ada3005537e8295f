//! The handle read endpoints use to reach the active snapshot.
//!
//! Activation swaps the store behind the handle; requests already holding the
//! previous `Arc` finish against the old snapshot.

use std::sync::{Arc, PoisonError, RwLock};

struct Slot<S> {
  name:  Option<String>,
  store: Arc<S>,
}

/// Shared, swappable reference to the snapshot currently being served.
pub struct ActiveStore<S> {
  slot: RwLock<Slot<S>>,
}

impl<S> ActiveStore<S> {
  /// `name` is `None` when the store is a placeholder rather than a
  /// catalogued snapshot.
  pub fn new(name: Option<String>, store: Arc<S>) -> Self {
    Self { slot: RwLock::new(Slot { name, store }) }
  }

  /// The store to use for one request.
  pub fn get(&self) -> Arc<S> {
    self.slot.read().unwrap_or_else(PoisonError::into_inner).store.clone()
  }

  /// Name of the snapshot being served, if any.
  pub fn name(&self) -> Option<String> {
    self.slot.read().unwrap_or_else(PoisonError::into_inner).name.clone()
  }

  /// Serve `store` from now on and return the previously served one.
  pub fn replace(&self, name: impl Into<String>, store: Arc<S>) -> Arc<S> {
    let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
    slot.name = Some(name.into());
    std::mem::replace(&mut slot.store, store)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn replace_swaps_store_and_name() {
    let active = ActiveStore::new(None, Arc::new(1_u32));
    assert_eq!(*active.get(), 1);
    assert_eq!(active.name(), None);

    let held = active.get();
    let previous = active.replace("snap_b", Arc::new(2));
    assert_eq!(*previous, 1);
    assert_eq!(*held, 1);
    assert_eq!(*active.get(), 2);
    assert_eq!(active.name().as_deref(), Some("snap_b"));
  }
}
