// ============================================================================
// Slot storage - Local key-value persistence (redb)
// ============================================================================
// Entitlement state lives in a single named slot holding a JSON document.
// Default path: ~/.gatekeeper/entitlements.redb (override via
// GATEKEEPER_DB_PATH env var or --db-path)
// ============================================================================

mod memory;
mod store;
pub mod types;

pub use memory::MemorySlotStore;
pub use store::{encode_table, EntitlementStore, DEFAULT_SLOT};
pub use types::{EntitlementRecord, EntitlementTable};

use anyhow::{anyhow, Result};
use redb::{Database, ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// Table definitions
const SLOTS: TableDefinition<&str, &str> = TableDefinition::new("slots");

/// A local key-value layer of named string slots
pub trait SlotStore {
    /// Read a slot; `None` if it was never written
    fn read_slot(&self, name: &str) -> Result<Option<String>>;

    /// Replace the whole value of a slot
    fn write_slot(&self, name: &str, value: &str) -> Result<()>;
}

/// Slot store backed by an embedded redb database
pub struct RedbSlotStore {
    db: Database,
    path: PathBuf,
}

impl RedbSlotStore {
    /// Open (or create) the database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening entitlement database at: {}", path.display());

        let db = Database::create(path)
            .map_err(|e| anyhow!("Failed to open database: {}", e))?;

        // Ensure the table exists so reads never hit a missing table
        let write_txn = db
            .begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let _ = write_txn
                .open_table(SLOTS)
                .map_err(|e| anyhow!("Failed to create slots table: {}", e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit init: {}", e))?;

        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of every slot currently stored
    pub fn list_slots(&self) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn.open_table(SLOTS)
            .map_err(|e| anyhow!("Failed to open slots table: {}", e))?;

        let mut names = Vec::new();
        let iter = table.range::<&str>(..)
            .map_err(|e| anyhow!("Failed to iterate slots: {}", e))?;
        for entry in iter {
            let (key, _value) = entry.map_err(|e| anyhow!("Failed to read entry: {}", e))?;
            names.push(key.value().to_string());
        }
        Ok(names)
    }
}

impl SlotStore for RedbSlotStore {
    fn read_slot(&self, name: &str) -> Result<Option<String>> {
        let read_txn = self.db.begin_read()
            .map_err(|e| anyhow!("Failed to begin read: {}", e))?;
        let table = read_txn.open_table(SLOTS)
            .map_err(|e| anyhow!("Failed to open slots table: {}", e))?;

        let value = table
            .get(name)
            .map_err(|e| anyhow!("Failed to get slot {}: {}", name, e))?
            .map(|guard| guard.value().to_string());

        debug!("Read slot {} ({})", name, if value.is_some() { "present" } else { "empty" });
        Ok(value)
    }

    fn write_slot(&self, name: &str, value: &str) -> Result<()> {
        let write_txn = self.db.begin_write()
            .map_err(|e| anyhow!("Failed to begin write: {}", e))?;
        {
            let mut table = write_txn.open_table(SLOTS)
                .map_err(|e| anyhow!("Failed to open slots table: {}", e))?;
            table.insert(name, value)
                .map_err(|e| anyhow!("Failed to insert slot {}: {}", name, e))?;
        }
        write_txn.commit().map_err(|e| anyhow!("Failed to commit: {}", e))?;

        debug!("Wrote slot {} ({} bytes)", name, value.len());
        Ok(())
    }
}
