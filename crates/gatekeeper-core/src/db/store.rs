//! ============================================================================
//! Entitlement Store - Whole-table load/save over a named slot
//! ============================================================================
//! The table is the unit of persistence: every save overwrites the slot with
//! the complete JSON document. Loading never fails. Missing, unreadable or
//! unparseable state all fall back to the zero-day default table.
//! ============================================================================

use anyhow::{anyhow, Result};
use tracing::{debug, warn};

use super::types::EntitlementTable;
use super::SlotStore;

/// Slot name used when none is configured
pub const DEFAULT_SLOT: &str = "tier_entitlements_v2";

/// Entitlement table persisted in one slot of a [`SlotStore`]
pub struct EntitlementStore<S: SlotStore> {
    slots: S,
    slot: String,
}

impl<S: SlotStore> EntitlementStore<S> {
    pub fn new(slots: S) -> Self {
        Self::with_slot(slots, DEFAULT_SLOT)
    }

    pub fn with_slot(slots: S, slot: &str) -> Self {
        Self {
            slots,
            slot: slot.to_string(),
        }
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Underlying slot store
    pub fn slots(&self) -> &S {
        &self.slots
    }

    /// Persisted table, or the default table when there is none to use
    pub fn load(&self) -> EntitlementTable {
        let raw = match self.slots.read_slot(&self.slot) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No entitlement state in slot {}, starting fresh", self.slot);
                return EntitlementTable::default();
            }
            Err(e) => {
                warn!("Failed to read slot {}: {} - using defaults", self.slot, e);
                return EntitlementTable::default();
            }
        };

        match serde_json::from_str::<EntitlementTable>(&raw) {
            Ok(table) => table,
            Err(e) => {
                warn!("Discarding unparseable entitlement state in slot {}: {}", self.slot, e);
                EntitlementTable::default()
            }
        }
    }

    /// Overwrite the slot with the full table
    pub fn save(&self, table: &EntitlementTable) -> Result<()> {
        let encoded = encode_table(table)?;
        self.slots.write_slot(&self.slot, &encoded)
    }
}

/// JSON document for a table, as written to the slot
pub fn encode_table(table: &EntitlementTable) -> Result<String> {
    serde_json::to_string(table).map_err(|e| anyhow!("Failed to serialize entitlements: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Tier;
    use crate::db::{EntitlementRecord, MemorySlotStore, RedbSlotStore};

    fn date(s: &str) -> chrono::NaiveDate {
        crate::clock::parse_date(s).unwrap()
    }

    #[test]
    fn test_load_without_state_is_default() {
        let store = EntitlementStore::new(MemorySlotStore::new());
        assert_eq!(store.load(), EntitlementTable::default());
        assert_eq!(store.slot(), DEFAULT_SLOT);
    }

    #[test]
    fn test_load_corrupt_state_is_default() {
        for garbage in ["not json", "null", "[]", r#"{"basic":{"days":"many"}}"#, ""] {
            let store = EntitlementStore::new(MemorySlotStore::with_slot(DEFAULT_SLOT, garbage));
            assert_eq!(store.load(), EntitlementTable::default(), "input: {:?}", garbage);
        }
    }

    #[test]
    fn test_save_then_load() {
        let store = EntitlementStore::new(MemorySlotStore::new());
        let mut table = EntitlementTable::default();
        table.set(Tier::Triplets, EntitlementRecord::granted(12, date("2026-03-04")));

        store.save(&table).unwrap();
        assert_eq!(store.load(), table);
    }

    #[test]
    fn test_save_of_load_leaves_slot_unchanged() {
        let slots = MemorySlotStore::new();
        let store = EntitlementStore::new(slots.clone());
        let mut table = EntitlementTable::default();
        table.set(Tier::Basic, EntitlementRecord::granted(18, date("2026-02-23")));
        store.save(&table).unwrap();
        let before = slots.raw(DEFAULT_SLOT);

        store.save(&store.load()).unwrap();
        assert_eq!(slots.raw(DEFAULT_SLOT), before);
    }

    #[test]
    fn test_custom_slot_is_isolated() {
        let slots = MemorySlotStore::new();
        let a = EntitlementStore::with_slot(slots.clone(), "device_a");
        let b = EntitlementStore::with_slot(slots.clone(), "device_b");

        let mut table = EntitlementTable::default();
        table.set(Tier::Premium, EntitlementRecord::granted(34, date("2026-02-22")));
        a.save(&table).unwrap();

        assert_eq!(a.load(), table);
        assert_eq!(b.load(), EntitlementTable::default());
        assert!(slots.raw(DEFAULT_SLOT).is_none());
    }

    #[test]
    fn test_save_failure_is_reported() {
        let slots = MemorySlotStore::new();
        slots.set_fail_writes(true);
        let store = EntitlementStore::new(slots);
        assert!(store.save(&EntitlementTable::default()).is_err());
    }

    #[test]
    fn test_redb_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entitlements.redb");
        let mut table = EntitlementTable::default();
        table.set(Tier::Premium, EntitlementRecord::granted(33, date("2026-02-23")));

        {
            let store = EntitlementStore::new(RedbSlotStore::open(&path).unwrap());
            store.save(&table).unwrap();
        }

        let store = EntitlementStore::new(RedbSlotStore::open(&path).unwrap());
        assert_eq!(store.load(), table);
    }
}
