//! In-process slot store. Clones share the same slots.

use anyhow::{anyhow, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::SlotStore;

#[derive(Debug, Clone, Default)]
pub struct MemorySlotStore {
    slots: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one slot value
    pub fn with_slot(name: &str, value: &str) -> Self {
        let store = Self::new();
        store.slots.borrow_mut().insert(name.to_string(), value.to_string());
        store
    }

    /// Make every subsequent write fail, to simulate an unavailable disk
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Raw slot contents, bypassing the trait
    pub fn raw(&self, name: &str) -> Option<String> {
        self.slots.borrow().get(name).cloned()
    }
}

impl SlotStore for MemorySlotStore {
    fn read_slot(&self, name: &str) -> Result<Option<String>> {
        Ok(self.raw(name))
    }

    fn write_slot(&self, name: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(anyhow!("Failed to write slot {}: storage unavailable", name));
        }
        self.slots.borrow_mut().insert(name.to_string(), value.to_string());
        Ok(())
    }
}
