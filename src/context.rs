// Explicit slot for the application's task store

use crate::kv::KvStore;
use crate::store::TaskStore;
use eyre::{Result, eyre};

/// Holds the one task store of a running application
///
/// Consumers reach the store through `store()`/`store_mut()`, which fail
/// fast until `provide` has been called.
pub struct TaskContext<K: KvStore> {
    store: Option<TaskStore<K>>,
}

impl<K: KvStore> Default for TaskContext<K> {
    fn default() -> Self {
        Self { store: None }
    }
}

impl<K: KvStore> TaskContext<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the store; fails if one is already installed
    pub fn provide(&mut self, store: TaskStore<K>) -> Result<()> {
        if self.store.is_some() {
            return Err(eyre!("task store already initialized"));
        }
        self.store = Some(store);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Result<&TaskStore<K>> {
        self.store.as_ref().ok_or_else(|| eyre!("task store not initialized"))
    }

    pub fn store_mut(&mut self) -> Result<&mut TaskStore<K>> {
        self.store.as_mut().ok_or_else(|| eyre!("task store not initialized"))
    }
}
